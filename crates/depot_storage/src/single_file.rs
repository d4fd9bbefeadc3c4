//! Monolithic layout: one file for the whole collection.

use crate::address::CollectionAddress;
use crate::atomic::{replace_file, sync_dir};
use crate::error::{StorageError, StorageResult};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Stores an entire collection as a single file at `⟨folder⟩/⟨name⟩⟨ext⟩`.
///
/// The payload is whatever the configured codec produced for the whole
/// collection; this store never interprets it. Writes replace the file
/// atomically, so concurrent readers observe either the previous or the new
/// collection state.
#[derive(Debug)]
pub struct SingleFileStore {
    path: PathBuf,
}

impl SingleFileStore {
    /// Creates a store for the given address and file extension.
    #[must_use]
    pub fn new(address: &CollectionAddress, extension: &str) -> Self {
        Self {
            path: address.data_file(extension),
        }
    }

    /// The path of the collection file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the current payload.
    ///
    /// A missing file (or missing folder) is an empty collection, not an
    /// error; any other read failure surfaces as [`StorageError::Io`].
    pub fn read(&self) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Atomically replaces the payload.
    pub fn replace(&self, bytes: &[u8]) -> StorageResult<()> {
        tracing::trace!(path = %self.path.display(), len = bytes.len(), "replacing collection file");
        replace_file(&self.path, bytes)
    }

    /// Deletes the collection file. Missing file is a no-op.
    pub fn remove(&self) -> StorageResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                if let Some(parent) = self.path.parent() {
                    sync_dir(parent)?;
                }
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// The files currently backing this collection (zero or one).
    pub fn files(&self) -> StorageResult<Vec<PathBuf>> {
        if self.path.exists() {
            Ok(vec![self.path.clone()])
        } else {
            Ok(Vec::new())
        }
    }
}
