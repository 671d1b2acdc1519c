//! # Shared
//! The shared components between the backup janitor library and its binary.
//!

#![warn(missing_docs)]

mod category;
mod failure;
mod logger;

pub use category::{BackupCategory, ParseCategoryError};
pub use failure::Failure;
pub use logger::{LoggerError, LoggerSettings, init_logger};
