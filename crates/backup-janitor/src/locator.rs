//! Discovery of the backups taken of each managed artifact.
//!
//! Backups sit next to the artifact they were taken of:
//!
//! | Category | Pattern |
//! |---|---|
//! | StorageConfig, Database, MachineId | `<artifact name>.bak.*` in the artifact's directory |
//! | Workspace | `<workspace dir name>_backup_*.zip` in the workspace dir's parent |
//!

use std::{
    collections::BTreeMap,
    path::{MAIN_SEPARATOR, Path, PathBuf},
};

use glob::{Pattern, PatternError, glob};
use serde::Serialize;
use shared::BackupCategory;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{PathResolver, ResolveError};

/// Backups found per category. Every managed category has an entry, sorted by path.
pub type BackupMap = BTreeMap<BackupCategory, Vec<PathBuf>>;

/// A single discovered backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupFile {
    /// Where the backup is.
    pub path: PathBuf,
    /// Which artifact it is a backup of.
    pub category: BackupCategory,
}

/// Finds backups of the artifacts a [`PathResolver`] points at.
#[derive(Debug, Clone)]
pub struct BackupLocator<R> {
    resolver: R,
}

impl<R: PathResolver> BackupLocator<R> {
    /// Create a locator over the given artifact locations.
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// The resolver this locator uses.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Find the backups of every managed artifact.
    ///
    /// Never fails. A category whose artifact is missing, or whose backups could
    /// not be enumerated, maps to whatever was found for it, possibly nothing.
    pub fn find_backups(&self) -> BackupMap {
        BackupCategory::MANAGED
            .into_iter()
            .map(|category| {
                let backups = match self.find_category(category) {
                    Ok(backups) => backups,
                    Err(error) => {
                        error!("Could not look for {category} files: {error}");
                        Vec::new()
                    }
                };

                (category, backups)
            })
            .collect()
    }

    /// Find the backups of a single artifact.
    pub fn find_category(
        &self,
        category: BackupCategory,
    ) -> Result<Vec<PathBuf>, DiscoveryError> {
        let artifact = self.resolver.resolve(category)?;

        if !artifact.exists() {
            debug!("{category}: artifact {artifact:?} does not exist");
            return Ok(Vec::new());
        }

        let pattern = backup_pattern(category, &artifact)?;
        debug!("{category}: searching {pattern}");

        let backups = glob(&pattern)?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(error) => {
                    warn!("{category}: could not read a possible backup: {error}");
                    None
                }
            })
            .collect();

        Ok(backups)
    }
}

/// Flatten a discovery snapshot into individual backups, in category order.
pub fn flatten(backups: &BackupMap) -> Vec<BackupFile> {
    backups
        .iter()
        .flat_map(|(category, paths)| {
            paths.iter().map(|path| BackupFile {
                path: path.clone(),
                category: *category,
            })
        })
        .collect()
}

/// The total number of backups in a discovery snapshot.
pub fn count(backups: &BackupMap) -> usize {
    backups.values().map(Vec::len).sum()
}

/// Build the glob matching the backups of `artifact`.
fn backup_pattern(category: BackupCategory, artifact: &Path) -> Result<String, DiscoveryError> {
    let name = artifact
        .file_name()
        .ok_or_else(|| DiscoveryError::NoFileName(artifact.to_path_buf()))?
        .to_string_lossy();

    let directory = match artifact.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let directory = Pattern::escape(&directory.to_string_lossy());
    let name = Pattern::escape(&name);

    let file_pattern = match category {
        BackupCategory::Workspace => format!("{name}_backup_*.zip"),
        _ => format!("{name}.bak.*"),
    };

    Ok(format!("{directory}{MAIN_SEPARATOR}{file_pattern}"))
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to resolve the artifact path: {0}")]
    Resolve(#[from] ResolveError),

    #[error("Artifact path {0:?} has no file name")]
    NoFileName(PathBuf),

    #[error("Failed to build a search pattern: {0}")]
    Pattern(#[from] PatternError),
}
