//! LifeBetter - Personal Productivity Library
//!
//! - Meta-learner: records task outcomes per task type and strategy, and
//!   recommends the approach with the best average score
//! - English error log: JSON log of writing corrections with daily reports
//! - Project tracker: tasks, milestones and progress notes in a JSON file
//!
//! # Example
//!
//! ```
//! use lifebetter::learning::{Experience, MetaLearner};
//!
//! let mut learner = MetaLearner::new(10, 0.01);
//! learner.learn_from_experience(Experience::new("classification", "random_forest", 0.8));
//! learner.learn_from_experience(Experience::new("classification", "neural_network", 0.9));
//! assert_eq!(learner.recommend("classification").approach, "neural_network");
//! ```

pub mod persist;
pub mod config;
pub mod learning;
pub mod english;
pub mod project;
pub mod cli;

// Re-export commonly used types for convenience
pub use learning::{
    Experience,
    LearnerConfig,
    LearnerStore,
    MetaLearner,
    Recommendation,
    Insights,
    SharedMetaLearner,
};

pub use english::{ErrorLog, ErrorLogManager};

pub use project::ProjectTracker;

pub use config::Config;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get the library info
pub fn info() -> String {
    format!("{} v{} - Personal Productivity Library", NAME, VERSION)
}
