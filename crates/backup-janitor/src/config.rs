use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use shared::LoggerSettings;
use thiserror::Error;

/// The canonical locations of the editor artifacts that get backed up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// The path to `storage.json`.
    pub storage_file: PathBuf,

    /// The path to the `state.vscdb` database.
    pub database_file: PathBuf,

    /// The path to the `machineid` file.
    pub machine_id_file: PathBuf,

    /// The path to the `workspaceStorage` directory.
    pub workspace_storage_dir: PathBuf,
}

impl ArtifactPaths {
    /// The artifact locations for an editor whose data lives in `code_dir`.
    pub fn in_code_dir(code_dir: &Path) -> Self {
        let user = code_dir.join("User");
        let global_storage = user.join("globalStorage");

        Self {
            storage_file: global_storage.join("storage.json"),
            database_file: global_storage.join("state.vscdb"),
            machine_id_file: code_dir.join("machineid"),
            workspace_storage_dir: user.join("workspaceStorage"),
        }
    }
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_code_dir(&default_code_dir())
    }
}

/// The editor's per-user data directory for the current platform.
fn default_code_dir() -> PathBuf {
    if cfg!(windows) {
        if let Some(app_data) = env::var_os("APPDATA") {
            return PathBuf::from(app_data).join("Code");
        }
    }

    let home = env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    if cfg!(target_os = "macos") {
        home.join("Library").join("Application Support").join("Code")
    } else {
        home.join(".config").join("Code")
    }
}

/// The janitor's config
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Where the managed artifacts live.
    #[serde(default)]
    pub artifacts: ArtifactPaths,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggerSettings,
}

impl Config {
    /// Tries to load a config from a toml file.
    pub fn load_toml(file_path: &Path) -> Result<Self, LoadConfigError> {
        if !file_path.exists() {
            return Err(LoadConfigError::NoFile);
        }

        let contents = fs::read_to_string(file_path).map_err(LoadConfigError::Read)?;
        let config = toml::from_str(&contents)?;

        Ok(config)
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoadConfigError {
    #[error("The file does not exist.")]
    NoFile,

    #[error("Failed to read the file:\n{0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to deserialize the file:\n{0}")]
    Deserialize(#[from] toml::de::Error),
}
