use std::path::PathBuf;
use thiserror::Error;

use crate::core::validator::ValidationError;

/// Errors that can occur in the settings layer.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Backup directory cannot be created or written to.
    #[error("Backup directory not writable: {0}")]
    BackupDirNotWritable(PathBuf),
    /// Settings key would escape the settings directory.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// Persisted settings text is not structurally valid.
    #[error("Malformed settings data: {0}")]
    Malformed(String),
    /// Failed to create backup file.
    #[error("Failed to create backup: {0}")]
    BackupFailed(String),
    /// Atomic write operation failed.
    #[error("Atomic write failed: {0}")]
    WriteFailed(String),
    /// A binding failed pre-save validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    /// Edit operation referenced a binding index that does not exist.
    #[error("No binding at index {0}")]
    IndexOutOfRange(usize),
    /// File watcher could not be installed.
    #[error("Failed to watch settings file: {0}")]
    WatchFailed(String),
    /// Generic I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
