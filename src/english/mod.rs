//! English learning error log
//!
//! Keeps a JSON log of writing corrections and renders daily reports.

pub mod log;
pub mod report;

pub use log::{ErrorEntry, ErrorLog, ErrorLogManager, LogStart, RecordedError};
pub use report::daily_report;
