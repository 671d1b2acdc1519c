use std::{path::PathBuf, sync::Arc};

use shared::BackupCategory;
use thiserror::Error;

use crate::ArtifactPaths;

/// Resolves where each managed artifact lives.
pub trait PathResolver {
    /// The canonical path of the artifact behind `category`.
    fn resolve(&self, category: BackupCategory) -> Result<PathBuf, ResolveError>;
}

impl PathResolver for ArtifactPaths {
    fn resolve(&self, category: BackupCategory) -> Result<PathBuf, ResolveError> {
        let path = match category {
            BackupCategory::StorageConfig => &self.storage_file,
            BackupCategory::Database => &self.database_file,
            BackupCategory::MachineId => &self.machine_id_file,
            BackupCategory::Workspace => &self.workspace_storage_dir,
            BackupCategory::Unknown => return Err(ResolveError::Unmanaged),
        };

        if path.as_os_str().is_empty() {
            return Err(ResolveError::NotConfigured(category));
        }

        Ok(path.clone())
    }
}

impl<R: PathResolver + ?Sized> PathResolver for &R {
    fn resolve(&self, category: BackupCategory) -> Result<PathBuf, ResolveError> {
        (**self).resolve(category)
    }
}

impl<R: PathResolver + ?Sized> PathResolver for Arc<R> {
    fn resolve(&self, category: BackupCategory) -> Result<PathBuf, ResolveError> {
        (**self).resolve(category)
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unknown backups have no canonical artifact")]
    Unmanaged,

    #[error("No path is configured for {0}")]
    NotConfigured(BackupCategory),
}
