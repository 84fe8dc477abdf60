//! Project tracker
//!
//! Manages to-do items, milestones and a progress log for a project directory.

pub mod task;
pub mod tracker;

pub use task::{Milestone, ParseError, Priority, ProgressEntry, Task, TaskStatus};
pub use tracker::{MilestoneSummary, ProjectSummary, ProjectTracker, StatusReport, TrackerData};
