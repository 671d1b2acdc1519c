use core::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The artifact a backup was taken of.
#[derive(Hash, Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum BackupCategory {
    /// A backup of the editor's `storage.json`.
    StorageConfig,

    /// A backup of the editor's `state.vscdb` database.
    Database,

    /// A backup of the editor's `machineid` file.
    MachineId,

    /// A zipped backup of the workspace storage directory.
    Workspace,

    /// A file that could not be attributed to any managed artifact.
    Unknown,
}

impl BackupCategory {
    /// The categories that have a canonical artifact on disk, in discovery order.
    pub const MANAGED: [Self; 4] = [
        Self::StorageConfig,
        Self::Database,
        Self::MachineId,
        Self::Workspace,
    ];

    /// Classify a backup by its file name.
    ///
    /// Substrings are tested in a fixed order so a name matching several of them
    /// always lands in the same category: `.zip`, then `storage.json`, then
    /// `state.vscdb`, then `machineid`. Anything else is [`Self::Unknown`].
    pub fn classify(file_name: &str) -> Self {
        if file_name.contains(".zip") {
            Self::Workspace
        } else if file_name.contains("storage.json") {
            Self::StorageConfig
        } else if file_name.contains("state.vscdb") {
            Self::Database
        } else if file_name.contains("machineid") {
            Self::MachineId
        } else {
            Self::Unknown
        }
    }

    /// A human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::StorageConfig => "Storage config backup",
            Self::Database => "Database backup",
            Self::MachineId => "Machine ID backup",
            Self::Workspace => "Workspace backup",
            Self::Unknown => "Unknown backup",
        }
    }
}

impl fmt::Display for BackupCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for BackupCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "StorageConfig" => Ok(Self::StorageConfig),
            "Database" => Ok(Self::Database),
            "MachineId" => Ok(Self::MachineId),
            "Workspace" => Ok(Self::Workspace),
            "Unknown" => Ok(Self::Unknown),
            _ => Err(ParseCategoryError(s.to_string())),
        }
    }
}

/// The string was not the name of a backup category.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid backup category '{0}'")]
pub struct ParseCategoryError(pub String);
