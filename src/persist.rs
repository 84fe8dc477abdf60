//! JSON state files shared by the file-backed stores
//!
//! Every store writes pretty-printed JSON (two-space indent, non-ASCII kept
//! as-is). A file that is not valid JSON is treated as "start over". A file
//! that is valid JSON but does not fit the expected layout is an error, so
//! it is never overwritten.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Result of reading a JSON state file
#[derive(Debug)]
pub enum Loaded<T> {
    /// File exists and parsed
    Existing(T),
    /// Nothing at the path
    Missing,
    /// File exists but is not valid JSON (syntax error or truncated)
    Corrupt(serde_json::Error),
}

/// Read and parse a JSON file without treating malformed JSON as an error.
///
/// I/O failures other than "not found" still propagate, and so does a
/// well-formed document whose shape does not match `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Loaded<T>> {
    if !path.exists() {
        return Ok(Loaded::Missing);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match serde_json::from_str(&content) {
        Ok(value) => Ok(Loaded::Existing(value)),
        Err(e) if matches!(e.classify(), Category::Syntax | Category::Eof) => Ok(Loaded::Corrupt(e)),
        Err(e) => Err(e).with_context(|| {
            format!("{} is valid JSON but does not match the expected layout", path.display())
        }),
    }
}

/// Load a JSON file, falling back to `fresh()` when it is missing or malformed.
pub fn load_or_fresh<T, F>(path: &Path, fresh: F) -> Result<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match read_json(path)? {
        Loaded::Existing(value) => Ok(value),
        Loaded::Missing => {
            debug!("No state at {}, starting fresh", path.display());
            Ok(fresh())
        }
        Loaded::Corrupt(e) => {
            warn!("Discarding unreadable state at {}: {}", path.display(), e);
            Ok(fresh())
        }
    }
}

/// Serialize `value` as pretty JSON, creating parent directories as needed.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(value)
        .context("Failed to serialize state")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    debug!("Wrote {}", path.display());
    Ok(())
}
