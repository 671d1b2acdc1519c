//! Bulk deletion of backups.
//!

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Serialize;
use shared::BackupCategory;
use tracing::{debug, error, info};

use crate::{
    BackupLocator, PathResolver,
    inspector::megabytes,
    locator::{self, BackupMap},
};

/// The message attached to a purge that found nothing to delete.
pub const NO_BACKUPS_FOUND: &str = "no backups found";

/// A path that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedDeletion {
    /// The path.
    pub path: PathBuf,
    /// Why it could not be deleted.
    pub error: String,
}

/// The result of deleting a batch of paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    /// How many files were deleted.
    pub deleted_count: usize,

    /// The files that could not be deleted, in the order they were attempted.
    pub failed: Vec<FailedDeletion>,

    /// The combined size of the deleted files.
    pub bytes_freed: u64,
}

impl DeletionOutcome {
    /// The space freed in megabytes.
    pub fn megabytes_freed(&self) -> f64 {
        megabytes(self.bytes_freed)
    }

    /// Record the removal of one path. Returns whether the path was deleted.
    fn record(&mut self, path: &Path, removal: Removal) -> bool {
        match removal {
            Removal::Deleted(bytes) => {
                self.deleted_count += 1;
                self.bytes_freed += bytes;
                true
            }
            Removal::Missing => false,
            Removal::Failed(error) => {
                self.failed.push(FailedDeletion {
                    path: path.to_path_buf(),
                    error,
                });
                false
            }
        }
    }
}

/// The result of purging every discovered backup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeSummary {
    /// The combined deletion outcome.
    pub outcome: DeletionOutcome,

    /// How many backups of each category discovery found and deletion was attempted on.
    pub attempted: BTreeMap<BackupCategory, usize>,

    /// How many backups of each category were actually deleted.
    pub removed: BTreeMap<BackupCategory, usize>,

    /// Set when discovery found nothing and the filesystem was left untouched.
    pub message: Option<&'static str>,
}

impl PurgeSummary {
    /// Whether discovery found no backups at all.
    pub fn nothing_found(&self) -> bool {
        self.message == Some(NO_BACKUPS_FOUND)
    }
}

/// What happened to a single path.
enum Removal {
    Deleted(u64),
    Missing,
    Failed(String),
}

/// Delete exactly the given paths.
///
/// Missing paths are skipped and are not failures. A path that cannot be deleted
/// is recorded in [`DeletionOutcome::failed`] and the rest of the batch carries on.
pub fn delete_files<P: AsRef<Path>>(paths: &[P]) -> DeletionOutcome {
    let mut outcome = DeletionOutcome::default();

    for path in paths {
        let path = path.as_ref();
        outcome.record(path, remove(path));
    }

    info!(
        "Deleted {} files, freed {:.2} MB, {} failed",
        outcome.deleted_count,
        outcome.megabytes_freed(),
        outcome.failed.len()
    );

    outcome
}

/// Discover every backup and delete it.
///
/// When nothing is found the filesystem is not touched and the summary carries
/// [`NO_BACKUPS_FOUND`].
pub fn purge_all_known_backups<R: PathResolver>(locator: &BackupLocator<R>) -> PurgeSummary {
    let snapshot = locator.find_backups();

    if locator::count(&snapshot) == 0 {
        info!("Purge: {NO_BACKUPS_FOUND}");
        return PurgeSummary {
            message: Some(NO_BACKUPS_FOUND),
            ..PurgeSummary::default()
        };
    }

    purge_snapshot(&snapshot)
}

/// Delete every backup in a discovery snapshot.
pub fn purge_snapshot(snapshot: &BackupMap) -> PurgeSummary {
    let mut summary = PurgeSummary::default();

    for (category, paths) in snapshot {
        summary.attempted.insert(*category, paths.len());

        let mut removed = 0;
        for path in paths {
            if summary.outcome.record(path, remove(path)) {
                removed += 1;
            }
        }
        summary.removed.insert(*category, removed);
    }

    info!(
        "Purge: deleted {} backups, freed {:.2} MB, {} failed",
        summary.outcome.deleted_count,
        summary.outcome.megabytes_freed(),
        summary.outcome.failed.len()
    );

    summary
}

fn remove(path: &Path) -> Removal {
    let size = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!("Skipping {path:?}, it no longer exists");
            return Removal::Missing;
        }
        Err(error) => {
            error!("Could not get {path:?} metadata: {error}");
            return Removal::Failed(error.to_string());
        }
    };

    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Deleted {path:?}");
            Removal::Deleted(size)
        }
        // Removed by someone else between the stat and the delete.
        Err(error) if error.kind() == ErrorKind::NotFound => Removal::Missing,
        Err(error) => {
            error!("Could not remove file {path:?}: {error}");
            Removal::Failed(error.to_string())
        }
    }
}
