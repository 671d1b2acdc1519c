use std::{fs::create_dir_all, io, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Level, subscriber::set_global_default};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{filter::Targets, layer::SubscriberExt, registry};

/// Where and how verbosely to log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggerSettings {
    /// The directory the rolling log files are written to.
    pub directory: PathBuf,

    /// The minimum level, one of `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,

    /// How many daily log files to keep.
    pub max_log_files: usize,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("./logs"),
            level: "info".to_string(),
            max_log_files: 30,
        }
    }
}

/// Create and set the global loggers.
pub fn init_logger(settings: &LoggerSettings) -> Result<Vec<WorkerGuard>, LoggerError> {
    create_dir_all(&settings.directory).map_err(LoggerError::CreateDirectory)?;

    let level: Level = settings
        .level
        .parse()
        .map_err(|_| LoggerError::InvalidLevel(settings.level.clone()))?;
    let filter = Targets::new().with_default(level);

    // File layer
    let (file_guard, file_layer) = {
        let appender = RollingFileAppender::builder()
            .filename_prefix("backup-janitor")
            .filename_suffix("log")
            .rotation(Rotation::DAILY)
            .max_log_files(settings.max_log_files)
            .build(&settings.directory)?;

        let (writer, guard) = tracing_appender::non_blocking(appender);

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_thread_names(true)
            .with_target(false);

        (guard, layer)
    };

    // Std layer
    let (std_guard, std_layer) = {
        let (writer, guard) = tracing_appender::non_blocking(io::stdout());

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(true)
            .with_target(false);

        (guard, layer)
    };

    let registry = registry().with(file_layer).with(std_layer).with(filter);

    set_global_default(registry)?;

    Ok(vec![file_guard, std_guard])
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to create rolling appender:\n{0}")]
    CreateRollingAppender(#[from] tracing_appender::rolling::InitError),

    #[error("Failed to create log directory:\n{0}")]
    CreateDirectory(#[source] io::Error),

    #[error("Invalid log level '{0}'")]
    InvalidLevel(String),

    #[error("A global logger is already set:\n{0}")]
    SetGlobal(#[from] tracing::subscriber::SetGlobalDefaultError),
}
