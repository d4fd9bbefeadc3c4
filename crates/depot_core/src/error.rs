//! Error types for repository operations.

use crate::key::Key;
use depot_codec::CodecError;
use depot_storage::StorageError;
use thiserror::Error;

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors that can occur in repository operations.
///
/// Codec and storage errors bubble up unchanged as their originating kind;
/// failures inside `save_changes` are wrapped into [`RepoError::Commit`] at
/// the commit boundary, preserving the cause for diagnostics.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Encoding or decoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A file or lock operation failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A strict lookup or partial update referenced a key with no stored
    /// record.
    #[error("no stored record for key {key}")]
    NotFound {
        /// Display form of the missing key.
        key: String,
    },

    /// A file-name stem could not be decoded back into a key.
    #[error("invalid key code: {code}")]
    InvalidKeyCode {
        /// The malformed stem.
        code: String,
    },

    /// The repository was configured inconsistently.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// A commit failed; the underlying cause is preserved.
    ///
    /// For the single-file layout the on-disk state is unchanged. For the
    /// per-object layout, files written before the failure remain.
    #[error("commit failed: {source}")]
    Commit {
        /// What went wrong inside the commit.
        #[source]
        source: Box<RepoError>,
    },
}

impl RepoError {
    /// Creates a not-found error for `key`.
    pub fn not_found(key: &Key) -> Self {
        Self::NotFound {
            key: key.to_string(),
        }
    }

    /// Creates an invalid key code error.
    pub fn invalid_key_code(code: impl Into<String>) -> Self {
        Self::InvalidKeyCode { code: code.into() }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Wraps a commit-internal failure.
    pub fn commit(source: RepoError) -> Self {
        Self::Commit {
            source: Box::new(source),
        }
    }

    /// Whether this error is a lock timeout (possibly inside a commit wrap).
    #[must_use]
    pub fn is_lock_timeout(&self) -> bool {
        match self {
            Self::Storage(StorageError::LockTimeout { .. }) => true,
            Self::Commit { source } => source.is_lock_timeout(),
            _ => false,
        }
    }
}
