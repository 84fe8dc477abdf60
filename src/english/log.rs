//! English error log - correction entries kept in a single JSON file
//!
//! Entries are stored twice: once in the flat `error_entries` list and once
//! under their local date in `daily_summaries`, which the daily report reads.

use anyhow::Result;
use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::persist::{self, Loaded};

/// A single correction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    /// Local time the error was recorded
    pub timestamp: NaiveDateTime,
    pub original_text: String,
    pub corrected_text: String,
    pub category: String,
    pub explanation: String,
    /// Keys this program does not know about, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The whole error log document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLog {
    pub learning_start_date: NaiveDate,
    #[serde(default)]
    pub total_errors: u64,
    /// Category -> number of errors ever recorded in it
    #[serde(default)]
    pub error_categories: BTreeMap<String, u64>,
    /// Local date -> that day's entries in recording order
    #[serde(default)]
    pub daily_summaries: BTreeMap<NaiveDate, Vec<ErrorEntry>>,
    #[serde(default)]
    pub error_entries: Vec<ErrorEntry>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ErrorLog {
    /// Empty log started on `start`
    pub fn new(start: NaiveDate) -> Self {
        Self {
            learning_start_date: start,
            total_errors: 0,
            error_categories: BTreeMap::new(),
            daily_summaries: BTreeMap::new(),
            error_entries: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Add an entry to every index
    pub fn record(&mut self, entry: ErrorEntry) {
        self.total_errors += 1;
        *self.error_categories.entry(entry.category.clone()).or_insert(0) += 1;
        self.daily_summaries
            .entry(entry.timestamp.date())
            .or_default()
            .push(entry.clone());
        self.error_entries.push(entry);
    }

    /// Entries recorded on `date`
    pub fn entries_on(&self, date: NaiveDate) -> &[ErrorEntry] {
        self.daily_summaries
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// How [`ErrorLogManager::init_or_resume`] obtained the log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStart {
    /// Existing file loaded
    Resumed,
    /// No file yet; a new one was written
    Created,
    /// File was malformed; replaced with a new one
    Recreated,
}

/// Result of adding an error
#[derive(Debug, Clone)]
pub struct RecordedError {
    pub entry: ErrorEntry,
    /// Total after this entry
    pub total_errors: u64,
}

/// Reads and writes the error log at a fixed path
pub struct ErrorLogManager {
    path: PathBuf,
}

impl ErrorLogManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the log for a session, writing a new one if the file is missing or
    /// not valid JSON.
    pub fn init_or_resume(&self) -> Result<(ErrorLog, LogStart)> {
        match persist::read_json::<ErrorLog>(&self.path)? {
            Loaded::Existing(log) => {
                info!(
                    "Resumed English learning tracking: {} errors since {}",
                    log.total_errors, log.learning_start_date
                );
                Ok((log, LogStart::Resumed))
            }
            Loaded::Missing => {
                let log = self.create_new()?;
                Ok((log, LogStart::Created))
            }
            Loaded::Corrupt(e) => {
                warn!("Error reading log file {} ({}), creating new one", self.path.display(), e);
                let log = self.create_new()?;
                Ok((log, LogStart::Recreated))
            }
        }
    }

    fn create_new(&self) -> Result<ErrorLog> {
        let log = ErrorLog::new(Local::now().date_naive());
        self.save(&log)?;
        info!("Started new English learning tracking session at {}", self.path.display());
        Ok(log)
    }

    /// Load the log; a missing or malformed file gives an empty log dated today.
    ///
    /// Nothing is written. A well-formed file with an unexpected layout is an
    /// error.
    pub fn load(&self) -> Result<ErrorLog> {
        persist::load_or_fresh(&self.path, || ErrorLog::new(Local::now().date_naive()))
    }

    pub fn save(&self, log: &ErrorLog) -> Result<()> {
        persist::write_json_pretty(&self.path, log)
    }

    /// Record a correction stamped with the current local time
    pub fn add_error(
        &self,
        original_text: &str,
        corrected_text: &str,
        category: &str,
        explanation: &str,
    ) -> Result<RecordedError> {
        self.add_error_at(
            original_text,
            corrected_text,
            category,
            explanation,
            Local::now().naive_local(),
        )
    }

    /// Record a correction with an explicit timestamp
    pub fn add_error_at(
        &self,
        original_text: &str,
        corrected_text: &str,
        category: &str,
        explanation: &str,
        timestamp: NaiveDateTime,
    ) -> Result<RecordedError> {
        let mut log = self.load()?;

        let entry = ErrorEntry {
            timestamp,
            original_text: original_text.to_string(),
            corrected_text: corrected_text.to_string(),
            category: category.to_string(),
            explanation: explanation.to_string(),
            extra: Map::new(),
        };
        log.record(entry.clone());
        self.save(&log)?;

        info!("Recorded error in category '{}'. Total errors now: {}", category, log.total_errors);
        Ok(RecordedError {
            entry,
            total_errors: log.total_errors,
        })
    }

    /// Report for `date`, or today when `None`
    pub fn daily_report(&self, date: Option<NaiveDate>) -> Result<String> {
        let date = date.unwrap_or_else(|| Local::now().date_naive());
        let log = self.load()?;
        Ok(super::report::daily_report(&log, date))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
