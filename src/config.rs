//! Configuration management
//!
//! Learner parameters and storage locations, kept in a TOML file under the
//! platform config directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::learning::LearnerConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Meta-learner parameters
    #[serde(default)]
    pub learner: LearnerConfig,
    /// Where state files live
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Storage locations; relative paths resolve against the data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory for state files (platform data dir when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// English error log file
    #[serde(default = "default_error_log_file")]
    pub error_log_file: PathBuf,
    /// Meta-learner snapshot file
    #[serde(default = "default_learner_state_file")]
    pub learner_state_file: PathBuf,
    /// Project directory whose `memory/` holds the tracker file
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,
}

fn default_error_log_file() -> PathBuf {
    PathBuf::from("english_learning").join("error_log.json")
}

fn default_learner_state_file() -> PathBuf {
    PathBuf::from("learner").join("state.json")
}

fn default_project_dir() -> PathBuf {
    PathBuf::from("project")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            error_log_file: default_error_log_file(),
            learner_state_file: default_learner_state_file(),
            project_dir: default_project_dir(),
        }
    }
}

impl StorageConfig {
    /// Base directory for relative storage paths
    pub fn base_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => data_dir(),
        }
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.base_dir()?.join(path))
        }
    }

    pub fn error_log_path(&self) -> Result<PathBuf> {
        self.resolve(&self.error_log_file)
    }

    pub fn learner_state_path(&self) -> Result<PathBuf> {
        self.resolve(&self.learner_state_file)
    }

    pub fn project_path(&self) -> Result<PathBuf> {
        self.resolve(&self.project_dir)
    }
}

impl Config {
    /// Load configuration from the default location, writing defaults on first use
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent()
            .context("Config path has no parent")?;

        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Reject values the learner cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.learner.memory_size == 0 {
            anyhow::bail!("learner.memory_size must be at least 1");
        }
        if !self.learner.learning_rate.is_finite() {
            anyhow::bail!("learner.learning_rate must be a finite number");
        }
        Ok(())
    }
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "lifebetter", "lifebetter")
        .context("Failed to get project directories")?;
    Ok(base.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    let base = directories::ProjectDirs::from("com", "lifebetter", "lifebetter")
        .context("Failed to get project directories")?;
    Ok(base.data_dir().to_path_buf())
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("Configuration");
    println!("=============");
    println!("Config file:     {}", config_path()?.display());
    println!();
    println!("[learner]");
    println!("  memory_size:   {}", config.learner.memory_size);
    println!("  learning_rate: {}", config.learner.learning_rate);
    println!();
    println!("[storage]");
    println!("  data_dir:      {}", config.storage.base_dir()?.display());
    println!("  error log:     {}", config.storage.error_log_path()?.display());
    println!("  learner state: {}", config.storage.learner_state_path()?.display());
    println!("  project dir:   {}", config.storage.project_path()?.display());
    Ok(())
}

/// Reset configuration to defaults
pub fn reset_config() -> Result<()> {
    let config = Config::default();
    config.save()?;
    println!("Configuration reset to defaults.");
    Ok(())
}

/// Get default configuration as TOML string
pub fn default_config_toml() -> String {
    let config = Config::default();
    toml::to_string_pretty(&config).unwrap_or_else(|_| "# Default configuration\n".to_string())
}
