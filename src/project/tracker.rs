//! Project tracker - tasks, milestones and a progress log in one JSON file
//!
//! The file lives at `<project_dir>/memory/project_tracker.json`. Every
//! mutation is written through immediately.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::task::{Milestone, Priority, ProgressEntry, Task, TaskStatus};
use crate::persist;

/// Number of progress entries included in a status report
const RECENT_PROGRESS: usize = 5;

/// The tracker document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerData {
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub progress_log: Vec<ProgressEntry>,
    /// Top-level keys this program does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrackerData {
    fn new() -> Self {
        Self {
            created_at: now(),
            tasks: Vec::new(),
            milestones: Vec::new(),
            progress_log: Vec::new(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub todo_tasks: usize,
    pub completion_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneSummary {
    pub total_milestones: usize,
    pub completed_milestones: usize,
    pub milestone_completion_percentage: f64,
}

/// Snapshot of project progress
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub project_summary: ProjectSummary,
    pub milestone_summary: MilestoneSummary,
    /// Up to the last five progress entries, oldest first
    pub recent_progress: Vec<ProgressEntry>,
}

/// File-backed project tracker
pub struct ProjectTracker {
    tracker_file: PathBuf,
    data: TrackerData,
}

impl ProjectTracker {
    /// Open the tracker for `project_dir`, creating its `memory` directory.
    ///
    /// A tracker file that is not valid JSON is replaced by an empty tracker
    /// on next save. Valid JSON with an unexpected layout is an error.
    pub fn open(project_dir: impl AsRef<Path>) -> Result<Self> {
        let tracker_file = project_dir.as_ref().join("memory").join("project_tracker.json");
        if let Some(parent) = tracker_file.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create project memory directory")?;
        }

        let data = persist::load_or_fresh(&tracker_file, TrackerData::new)?;
        debug!(
            "Opened tracker {} ({} tasks, {} milestones)",
            tracker_file.display(),
            data.tasks.len(),
            data.milestones.len()
        );
        Ok(Self { tracker_file, data })
    }

    /// Add a task; ids are assigned as task count + 1
    pub fn add_task(
        &mut self,
        title: &str,
        description: &str,
        priority: Priority,
        status: TaskStatus,
    ) -> Result<Task> {
        let now = now();
        let task = Task {
            id: next_id(self.data.tasks.len()).context("Too many tasks")?,
            title: title.to_string(),
            description: description.to_string(),
            priority,
            status,
            created_at: now,
            updated_at: now,
            extra: Map::new(),
        };
        self.data.tasks.push(task.clone());
        self.save()?;

        info!("Added task #{}: {}", task.id, task.title);
        Ok(task)
    }

    /// Set a task's status. Returns `false` if no task has that id.
    pub fn update_task_status(&mut self, task_id: u32, status: TaskStatus) -> Result<bool> {
        let Some(task) = self.data.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Ok(false);
        };
        task.status = status;
        task.updated_at = now();
        self.save()?;

        info!("Task #{} is now {}", task_id, status);
        Ok(true)
    }

    /// Add a milestone; ids are assigned as milestone count + 1
    pub fn add_milestone(
        &mut self,
        title: &str,
        description: &str,
        target_date: Option<&str>,
    ) -> Result<Milestone> {
        let milestone = Milestone {
            id: next_id(self.data.milestones.len()).context("Too many milestones")?,
            title: title.to_string(),
            description: description.to_string(),
            target_date: target_date.map(|s| s.to_string()),
            completed: false,
            created_at: now(),
            extra: Map::new(),
        };
        self.data.milestones.push(milestone.clone());
        self.save()?;

        info!("Added milestone #{}: {}", milestone.id, milestone.title);
        Ok(milestone)
    }

    /// Mark a milestone complete. Returns `false` if no milestone has that id.
    pub fn mark_milestone_complete(&mut self, milestone_id: u32) -> Result<bool> {
        let Some(milestone) = self.data.milestones.iter_mut().find(|m| m.id == milestone_id) else {
            return Ok(false);
        };
        milestone.completed = true;
        self.save()?;

        info!("Milestone #{} completed", milestone_id);
        Ok(true)
    }

    pub fn log_progress(&mut self, entry: &str) -> Result<ProgressEntry> {
        let log_entry = ProgressEntry {
            date: now(),
            entry: entry.to_string(),
            extra: Map::new(),
        };
        self.data.progress_log.push(log_entry.clone());
        self.save()?;
        Ok(log_entry)
    }

    pub fn save(&self) -> Result<()> {
        persist::write_json_pretty(&self.tracker_file, &self.data)
    }

    /// Counts, completion percentages and the most recent progress entries
    pub fn status_report(&self) -> StatusReport {
        let tasks = &self.data.tasks;
        let count_status = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();

        let total_tasks = tasks.len();
        let completed_tasks = count_status(TaskStatus::Done);

        let total_milestones = self.data.milestones.len();
        let completed_milestones = self.data.milestones.iter().filter(|m| m.completed).count();

        let log = &self.data.progress_log;
        let recent_start = log.len().saturating_sub(RECENT_PROGRESS);

        StatusReport {
            project_summary: ProjectSummary {
                total_tasks,
                completed_tasks,
                in_progress_tasks: count_status(TaskStatus::InProgress),
                todo_tasks: count_status(TaskStatus::Todo),
                completion_percentage: percentage(completed_tasks, total_tasks),
            },
            milestone_summary: MilestoneSummary {
                total_milestones,
                completed_milestones,
                milestone_completion_percentage: percentage(completed_milestones, total_milestones),
            },
            recent_progress: log[recent_start..].to_vec(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.data.tasks
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.data.milestones
    }

    pub fn data(&self) -> &TrackerData {
        &self.data
    }

    pub fn tracker_file(&self) -> &Path {
        &self.tracker_file
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Id for the record after `count` existing ones
fn next_id(count: usize) -> Option<u32> {
    u32::try_from(count).ok()?.checked_add(1)
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_memory_dir() {
        let dir = tempfile::tempdir().unwrap();
        let tracker = ProjectTracker::open(dir.path()).unwrap();
        assert!(dir.path().join("memory").is_dir());
        assert!(tracker.tasks().is_empty());
        // Nothing written until the first mutation
        assert!(!tracker.tracker_file().exists());
    }

    #[test]
    fn test_tasks_and_status_updates() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = ProjectTracker::open(dir.path()).unwrap();

        let first = tracker.add_task("Implement core", "meta-learner", Priority::High, TaskStatus::InProgress).unwrap();
        let second = tracker.add_task("Write docs", "", Priority::Medium, TaskStatus::Todo).unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        assert!(tracker.update_task_status(2, TaskStatus::Done).unwrap());
        assert!(!tracker.update_task_status(42, TaskStatus::Done).unwrap());

        let reopened = ProjectTracker::open(dir.path()).unwrap();
        assert_eq!(reopened.tasks()[1].status, TaskStatus::Done);
        assert!(reopened.tasks()[1].updated_at >= reopened.tasks()[1].created_at);
        assert_eq!(reopened.tasks()[0].priority, Priority::High);
    }

    #[test]
    fn test_milestones() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = ProjectTracker::open(dir.path()).unwrap();

        let m = tracker.add_milestone("Alpha Release", "first working version", Some("2023-12-31")).unwrap();
        assert_eq!(m.id, 1);
        assert!(!m.completed);
        tracker.add_milestone("Beta", "", None).unwrap();

        assert!(tracker.mark_milestone_complete(1).unwrap());
        assert!(!tracker.mark_milestone_complete(9).unwrap());

        let reopened = ProjectTracker::open(dir.path()).unwrap();
        assert!(reopened.milestones()[0].completed);
        assert_eq!(reopened.milestones()[0].target_date.as_deref(), Some("2023-12-31"));
        assert_eq!(reopened.milestones()[1].target_date, None);
    }

    #[test]
    fn test_status_report() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = ProjectTracker::open(dir.path()).unwrap();

        let empty = tracker.status_report();
        assert_eq!(empty.project_summary.completion_percentage, 0.0);
        assert_eq!(empty.milestone_summary.milestone_completion_percentage, 0.0);
        assert!(empty.recent_progress.is_empty());

        tracker.add_task("a", "", Priority::Low, TaskStatus::Done).unwrap();
        tracker.add_task("b", "", Priority::Low, TaskStatus::InProgress).unwrap();
        tracker.add_task("c", "", Priority::Low, TaskStatus::Todo).unwrap();
        tracker.add_task("d", "", Priority::Low, TaskStatus::Todo).unwrap();
        tracker.add_milestone("m1", "", None).unwrap();
        tracker.add_milestone("m2", "", None).unwrap();
        tracker.mark_milestone_complete(2).unwrap();
        for i in 1..=7 {
            tracker.log_progress(&format!("step {}", i)).unwrap();
        }

        let report = tracker.status_report();
        assert_eq!(report.project_summary.total_tasks, 4);
        assert_eq!(report.project_summary.completed_tasks, 1);
        assert_eq!(report.project_summary.in_progress_tasks, 1);
        assert_eq!(report.project_summary.todo_tasks, 2);
        assert_eq!(report.project_summary.completion_percentage, 25.0);
        assert_eq!(report.milestone_summary.completed_milestones, 1);
        assert_eq!(report.milestone_summary.milestone_completion_percentage, 50.0);

        let recent: Vec<&str> = report.recent_progress.iter().map(|p| p.entry.as_str()).collect();
        assert_eq!(recent, vec!["step 3", "step 4", "step 5", "step 6", "step 7"]);
    }

    #[test]
    fn test_corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("memory")).unwrap();
        std::fs::write(dir.path().join("memory").join("project_tracker.json"), "not json").unwrap();

        let mut tracker = ProjectTracker::open(dir.path()).unwrap();
        assert!(tracker.tasks().is_empty());
        let task = tracker.add_task("recover", "", Priority::Medium, TaskStatus::Todo).unwrap();
        assert_eq!(task.id, 1);
    }

    #[test]
    fn test_file_shape() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = ProjectTracker::open(dir.path()).unwrap();
        tracker.add_task("shape", "", Priority::High, TaskStatus::InProgress).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(tracker.tracker_file()).unwrap()).unwrap();
        for key in ["created_at", "tasks", "milestones", "progress_log"] {
            assert!(raw.get(key).is_some(), "Missing key {}", key);
        }
        assert_eq!(raw["tasks"][0]["priority"], "high");
        assert_eq!(raw["tasks"][0]["status"], "in_progress");
        assert_eq!(raw["tasks"][0]["id"], 1);
    }

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(0), Some(1));
        assert_eq!(next_id(41), Some(42));
        assert_eq!(next_id(u32::MAX as usize), None);
        assert_eq!(next_id(usize::MAX), None);
    }

    #[test]
    fn test_unknown_keys_survive_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let memory = dir.path().join("memory");
        std::fs::create_dir_all(&memory).unwrap();
        std::fs::write(
            memory.join("project_tracker.json"),
            r#"{
  "created_at": "2025-01-10T08:00:00.123456",
  "owner": "junjie",
  "tasks": [
    {"id": 1, "title": "Implement core", "description": "", "priority": "high",
     "status": "todo", "created_at": "2025-01-10T08:01:00", "updated_at": "2025-01-10T08:01:00",
     "tags": ["a"]}
  ],
  "milestones": [
    {"id": 1, "title": "Alpha", "description": "", "target_date": null, "completed": false,
     "created_at": "2025-01-10T08:02:00", "owner": "sam"}
  ],
  "progress_log": [
    {"date": "2025-01-10T09:00:00", "entry": "kickoff", "mood": "good"}
  ]
}"#,
        )
        .unwrap();

        let mut tracker = ProjectTracker::open(dir.path()).unwrap();
        tracker.add_task("Write tests", "", Priority::Medium, TaskStatus::Todo).unwrap();
        tracker.update_task_status(1, TaskStatus::Done).unwrap();

        let raw: Value =
            serde_json::from_str(&std::fs::read_to_string(tracker.tracker_file()).unwrap()).unwrap();
        assert_eq!(raw["owner"], "junjie");
        assert_eq!(raw["tasks"][0]["tags"], serde_json::json!(["a"]));
        assert_eq!(raw["tasks"][0]["status"], "done");
        assert_eq!(raw["tasks"][1]["id"], 2);
        assert_eq!(raw["milestones"][0]["owner"], "sam");
        assert_eq!(raw["progress_log"][0]["mood"], "good");

        let reopened = ProjectTracker::open(dir.path()).unwrap();
        assert_eq!(reopened.data(), tracker.data());
    }

    #[test]
    fn test_mismatched_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let memory = dir.path().join("memory");
        std::fs::create_dir_all(&memory).unwrap();
        let file = memory.join("project_tracker.json");
        let original = r#"{
  "created_at": "2025-01-10T08:00:00+00:00",
  "tasks": [
    {"id": 1, "title": "Implement core", "priority": "high", "status": "todo",
     "created_at": "2025-01-10T08:01:00", "updated_at": "2025-01-10T08:01:00"}
  ],
  "milestones": [],
  "progress_log": []
}"#;
        std::fs::write(&file, original).unwrap();

        let err = ProjectTracker::open(dir.path()).err().unwrap();
        assert!(format!("{:#}", err).contains("does not match the expected layout"));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), original);
    }
}
