//! Meta-learner - bounded experience ledger plus per-task strategy statistics
//!
//! Every recorded experience lands in a FIFO ledger capped at `memory_size`
//! and updates a running average for its (task type, approach) pair. A
//! recommendation is the approach with the best average for a task type.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use tracing::{debug, warn};

use super::experience::{Experience, DEFAULT_APPROACH};

/// Default ledger capacity
pub const DEFAULT_MEMORY_SIZE: usize = 1000;

/// Default learning rate echoed in recommendations
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;

/// Learner construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearnerConfig {
    /// Maximum number of experiences kept in the ledger
    #[serde(default = "default_memory_size")]
    pub memory_size: usize,
    /// Carried into recommendations; not used in any computation
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
}

fn default_memory_size() -> usize {
    DEFAULT_MEMORY_SIZE
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            memory_size: default_memory_size(),
            learning_rate: default_learning_rate(),
        }
    }
}

/// Running statistics for one (task type, approach) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyStats {
    pub count: u64,
    pub total_score: f64,
    pub avg_score: f64,
}

impl StrategyStats {
    fn new() -> Self {
        Self {
            count: 0,
            total_score: 0.0,
            avg_score: 0.0,
        }
    }

    fn observe(&mut self, score: f64) {
        self.count += 1;
        self.total_score += score;
        // Recomputed from the totals, never adjusted incrementally
        self.avg_score = self.total_score / self.count as f64;
    }
}

/// Suggested strategy for a task type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub learning_rate: f64,
    pub approach: String,
    /// Human-readable rationale, never empty
    pub suggestions: Vec<String>,
}

/// Summary of the learner's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    /// Experiences currently held in the ledger
    pub total_experiences: usize,
    /// Ledger length divided by capacity, in [0, 1]
    pub memory_usage: f64,
    /// Number of distinct task types seen
    pub meta_knowledge_size: usize,
}

/// Statistics table: task type -> approach -> stats
///
/// Approaches are kept in lexicographic order, which fixes the tie-break in
/// [`MetaLearner::recommend`].
pub type MetaKnowledge = BTreeMap<String, BTreeMap<String, StrategyStats>>;

/// Experience ledger and strategy recommender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaLearner {
    memory_size: usize,
    learning_rate: f64,
    experience_memory: VecDeque<Experience>,
    meta_knowledge: MetaKnowledge,
}

impl MetaLearner {
    /// Create an empty learner.
    ///
    /// A `memory_size` of zero is raised to one.
    pub fn new(memory_size: usize, learning_rate: f64) -> Self {
        Self {
            memory_size: clamp_memory_size(memory_size),
            learning_rate,
            experience_memory: VecDeque::new(),
            meta_knowledge: MetaKnowledge::new(),
        }
    }

    /// Create an empty learner from a config block
    pub fn from_config(config: &LearnerConfig) -> Self {
        Self::new(config.memory_size, config.learning_rate)
    }

    /// Record an experience: append it to the ledger (evicting the oldest
    /// entry on overflow) and fold its score into the statistics table.
    pub fn learn_from_experience(&mut self, experience: Experience) {
        self.update_meta_knowledge(&experience);

        self.experience_memory.push_back(experience);
        while self.experience_memory.len() > self.memory_size {
            self.experience_memory.pop_front();
        }
    }

    /// Normalize loose JSON and record it
    pub fn learn_from_value(&mut self, value: serde_json::Value) {
        self.learn_from_experience(Experience::from_value(value));
    }

    fn update_meta_knowledge(&mut self, experience: &Experience) {
        let stats = self
            .meta_knowledge
            .entry(experience.task_type.clone())
            .or_default()
            .entry(experience.approach().to_string())
            .or_insert_with(StrategyStats::new);
        stats.observe(experience.score());

        debug!(
            "Updated {}/{}: count={} avg={:.4}",
            experience.task_type,
            experience.approach(),
            stats.count,
            stats.avg_score
        );
    }

    /// Recommend the approach with the highest average score for `task_type`.
    ///
    /// Exact ties go to the lexicographically smallest approach. Unknown task
    /// types get the default approach.
    pub fn recommend(&self, task_type: &str) -> Recommendation {
        let mut best: Option<(&str, f64)> = None;
        if let Some(strategies) = self.meta_knowledge.get(task_type) {
            for (approach, stats) in strategies {
                if best.map_or(true, |(_, score)| stats.avg_score > score) {
                    best = Some((approach.as_str(), stats.avg_score));
                }
            }
        }

        let (approach, suggestion) = match best {
            Some((approach, score)) => (
                approach.to_string(),
                format!("Selected '{}' based on historical avg score: {:.2}", approach, score),
            ),
            None => (
                DEFAULT_APPROACH.to_string(),
                "No historical data for this task type; using default.".to_string(),
            ),
        };

        Recommendation {
            learning_rate: self.learning_rate,
            approach,
            suggestions: vec![suggestion],
        }
    }

    /// Ledger size, utilization and number of known task types
    pub fn insights(&self) -> Insights {
        Insights {
            total_experiences: self.experience_memory.len(),
            memory_usage: self.experience_memory.len() as f64 / self.memory_size as f64,
            meta_knowledge_size: self.meta_knowledge.len(),
        }
    }

    /// Adopt new capacity and learning rate, evicting the oldest experiences
    /// if the ledger no longer fits. Statistics are left untouched.
    pub fn reconfigure(&mut self, config: &LearnerConfig) {
        self.memory_size = clamp_memory_size(config.memory_size);
        self.learning_rate = config.learning_rate;
        while self.experience_memory.len() > self.memory_size {
            self.experience_memory.pop_front();
        }
    }

    pub fn memory_size(&self) -> usize {
        self.memory_size
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Ledger contents, oldest first
    pub fn experiences(&self) -> impl Iterator<Item = &Experience> {
        self.experience_memory.iter()
    }

    pub fn meta_knowledge(&self) -> &MetaKnowledge {
        &self.meta_knowledge
    }

    /// Statistics for one (task type, approach) pair
    pub fn stats(&self, task_type: &str, approach: &str) -> Option<&StrategyStats> {
        self.meta_knowledge.get(task_type)?.get(approach)
    }
}

impl Default for MetaLearner {
    fn default() -> Self {
        Self::from_config(&LearnerConfig::default())
    }
}

fn clamp_memory_size(memory_size: usize) -> usize {
    if memory_size == 0 {
        warn!("memory_size must be positive; using 1");
        1
    } else {
        memory_size
    }
}
