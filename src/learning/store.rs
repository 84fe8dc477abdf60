//! Learner Store - JSON snapshots of a meta-learner between CLI runs
//!
//! The learner itself has no persistence. This store is the caller-side layer
//! that keeps the ledger and statistics table in a single JSON file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::meta_learner::{LearnerConfig, MetaLearner};
use crate::persist::{self, Loaded};

/// Snapshot file for one learner
pub struct LearnerStore {
    path: PathBuf,
    config: LearnerConfig,
}

impl LearnerStore {
    /// Store at an explicit file path, using `config` for fresh learners
    pub fn new(path: impl Into<PathBuf>, config: LearnerConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Load the stored learner.
    ///
    /// A missing snapshot, or one that is not valid JSON, yields a fresh
    /// learner. Valid JSON that is not a learner snapshot is an error and the
    /// file is left alone; `reset` clears it. A snapshot taken under a different capacity or learning rate is brought in line
    /// with the current config.
    pub fn load(&self) -> Result<MetaLearner> {
        let mut learner = match persist::read_json::<MetaLearner>(&self.path)? {
            Loaded::Existing(learner) => learner,
            Loaded::Missing => return Ok(MetaLearner::from_config(&self.config)),
            Loaded::Corrupt(e) => {
                warn!("Learner state at {} is unreadable ({}), starting fresh", self.path.display(), e);
                return Ok(MetaLearner::from_config(&self.config));
            }
        };

        if learner.memory_size() != self.config.memory_size
            || learner.learning_rate() != self.config.learning_rate
        {
            info!(
                "Adopting configured memory_size={} learning_rate={} (snapshot had {} / {})",
                self.config.memory_size,
                self.config.learning_rate,
                learner.memory_size(),
                learner.learning_rate()
            );
            learner.reconfigure(&self.config);
        }

        Ok(learner)
    }

    /// Write the learner snapshot
    pub fn save(&self, learner: &MetaLearner) -> Result<()> {
        persist::write_json_pretty(&self.path, learner)?;
        info!(
            "Saved learner with {} experiences to {}",
            learner.insights().total_experiences,
            self.path.display()
        );
        Ok(())
    }

    /// Delete the snapshot, if any
    pub fn reset(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
            info!("Removed learner state at {}", self.path.display());
        }
        Ok(())
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::learning::Experience;

    fn config(memory_size: usize) -> LearnerConfig {
        LearnerConfig { memory_size, learning_rate: 0.01 }
    }

    #[test]
    fn test_missing_snapshot_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = LearnerStore::new(dir.path().join("state.json"), config(10));
        let learner = store.load().unwrap();
        assert_eq!(learner.insights().total_experiences, 0);
        assert_eq!(learner.memory_size(), 10);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = LearnerStore::new(dir.path().join("learner").join("state.json"), config(10));

        let mut learner = store.load().unwrap();
        learner.learn_from_experience(Experience::new("classification", "random_forest", 0.8));
        learner.learn_from_experience(Experience::new("classification", "neural_network", 0.9));
        store.save(&learner).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.insights(), learner.insights());
        assert_eq!(loaded.meta_knowledge(), learner.meta_knowledge());
        assert_eq!(loaded.recommend("classification").approach, "neural_network");
        let order: Vec<&str> = loaded.experiences().map(|e| e.approach()).collect();
        assert_eq!(order, vec!["random_forest", "neural_network"]);
    }

    #[test]
    fn test_corrupt_snapshot_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let store = LearnerStore::new(&path, config(10));
        assert_eq!(store.load().unwrap().insights().total_experiences, 0);
    }

    #[test]
    fn test_foreign_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{\"memory_size\": \"large\"}").unwrap();

        let store = LearnerStore::new(&path, config(10));
        assert!(store.load().is_err());
        assert!(path.exists());

        store.reset().unwrap();
        assert_eq!(store.load().unwrap().insights().total_experiences, 0);
    }

    #[test]
    fn test_smaller_config_trims_loaded_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut learner = MetaLearner::new(10, 0.01);
        for i in 0..8 {
            learner.learn_from_experience(Experience::new(format!("t{}", i), "a", 1.0));
        }
        LearnerStore::new(&path, config(10)).save(&learner).unwrap();

        let loaded = LearnerStore::new(&path, config(3)).load().unwrap();
        assert_eq!(loaded.memory_size(), 3);
        let kept: Vec<&str> = loaded.experiences().map(|e| e.task_type.as_str()).collect();
        assert_eq!(kept, vec!["t5", "t6", "t7"]);
        assert_eq!(loaded.insights().meta_knowledge_size, 8);
    }

    #[test]
    fn test_reset_removes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = LearnerStore::new(dir.path().join("state.json"), config(10));
        store.save(&MetaLearner::new(10, 0.01)).unwrap();
        assert!(store.path().exists());

        store.reset().unwrap();
        assert!(!store.path().exists());
        store.reset().unwrap();
    }
}
