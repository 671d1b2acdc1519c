//! Display metadata for a single backup.
//!

use core::fmt;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use chrono::{DateTime, Local, TimeZone};
use regex::Regex;
use serde::Serialize;
use shared::BackupCategory;
use tracing::warn;

/// The first 10 consecutive ASCII digits in a backup's file name.
static EPOCH_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[0-9]{10}").expect("epoch token pattern is valid"));

const UNKNOWN: &str = "unknown";

/// What is known about a backup at the moment it was inspected.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackupInfo {
    /// The inspected path.
    pub path: PathBuf,

    /// The size in bytes, `None` if the file could not be read.
    pub size_bytes: Option<u64>,

    /// When the backup was taken, per the epoch token in its file name.
    pub created_at: Option<DateTime<Local>>,

    /// The backup's category, `None` if the file could not be read.
    pub category: Option<BackupCategory>,
}

impl BackupInfo {
    /// The size in megabytes with two decimals, e.g. `1.50 MB`.
    pub fn size_display(&self) -> String {
        match self.size_bytes {
            Some(bytes) => format!("{:.2} MB", megabytes(bytes)),
            None => UNKNOWN.to_string(),
        }
    }

    /// The creation time as a local timestamp.
    pub fn created_display(&self) -> String {
        match &self.created_at {
            Some(created_at) => created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => UNKNOWN.to_string(),
        }
    }

    /// The category label, or `error` if the file could not be read.
    pub fn category_display(&self) -> &'static str {
        match &self.category {
            Some(category) => category.label(),
            None => "error",
        }
    }
}

impl fmt::Display for BackupInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.category_display(),
            self.size_display(),
            self.created_display()
        )
    }
}

/// Inspect a backup. Never fails: an unreadable file yields unknown size,
/// creation time and category.
pub fn inspect(path: impl AsRef<Path>) -> BackupInfo {
    let path = path.as_ref();

    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(error) => {
            warn!("Could not get backup {path:?} metadata: {error}");
            return BackupInfo {
                path: path.to_path_buf(),
                size_bytes: None,
                created_at: None,
                category: None,
            };
        }
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    BackupInfo {
        path: path.to_path_buf(),
        size_bytes: Some(metadata.len()),
        created_at: created_at(&file_name),
        category: Some(BackupCategory::classify(&file_name)),
    }
}

/// Read the creation time from the first 10 digit run in `file_name`.
///
/// The file name is authoritative. Backups get copied and moved, so filesystem
/// timestamps say nothing about when they were taken.
pub fn created_at(file_name: &str) -> Option<DateTime<Local>> {
    let token = EPOCH_TOKEN.find(file_name)?;
    let seconds: i64 = token.as_str().parse().ok()?;

    Local.timestamp_opt(seconds, 0).single()
}

/// Bytes to mebibytes.
#[allow(clippy::as_conversions)]
pub fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
