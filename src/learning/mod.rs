//! Meta-Learning System
//!
//! Records task outcomes keyed by task type and strategy approach, keeps
//! running average scores, and recommends the historically best approach.

pub mod experience;
pub mod meta_learner;
pub mod shared;
pub mod store;

pub use experience::{Experience, Outcome, Strategy, DEFAULT_APPROACH, DEFAULT_TASK_TYPE};
pub use meta_learner::{
    Insights, LearnerConfig, MetaKnowledge, MetaLearner, Recommendation, StrategyStats,
    DEFAULT_LEARNING_RATE, DEFAULT_MEMORY_SIZE,
};
pub use shared::SharedMetaLearner;
pub use store::LearnerStore;
