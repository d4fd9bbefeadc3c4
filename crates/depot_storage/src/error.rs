//! Error types for storage operations.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The collection folder exists but is not usable.
    #[error("collection folder is not usable: {path}")]
    UnusableFolder {
        /// The offending path.
        path: String,
    },

    /// The exclusive collection lock could not be acquired in time.
    #[error("lock timeout after {waited:?} on collection {address}")]
    LockTimeout {
        /// Canonical collection address that was contended.
        address: String,
        /// How long the caller waited before giving up.
        waited: Duration,
    },
}

impl StorageError {
    /// Creates an unusable-folder error.
    pub fn unusable_folder(path: impl Into<String>) -> Self {
        Self::UnusableFolder { path: path.into() }
    }
}
