//! # backup-janitor
//! Finds, inspects and deletes the backups taken of an editor's device
//! identity artifacts, and runs long maintenance actions on a single
//! background worker.
//!

mod config;
mod context;
pub mod inspector;
pub mod locator;
pub mod orchestrator;
pub mod purger;
mod resolver;

pub use config::{ArtifactPaths, Config, LoadConfigError};
pub use context::Context;
pub use inspector::{BackupInfo, inspect};
pub use locator::{BackupFile, BackupLocator, BackupMap, DiscoveryError};
pub use orchestrator::{
    ChannelSink, Operation, OperationError, OperationEvent, OperationSink, OperationState,
    Progress, ProgressSink, recv_outcome,
};
pub use purger::{
    DeletionOutcome, FailedDeletion, NO_BACKUPS_FOUND, PurgeSummary, delete_files,
    purge_all_known_backups,
};
pub use resolver::{PathResolver, ResolveError};
pub use shared::BackupCategory;
