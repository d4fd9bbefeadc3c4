//! Repository configuration.

use crate::error::{RepoError, RepoResult};
use depot_codec::{JsonCodec, StreamCodec};
use depot_storage::FileStorageType;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a file-system repository.
///
/// The codec and the file extension are configured together: the extension
/// defaults to the codec's own suffix and may be overridden (for example
/// `.txt.gz` with the gzip codec), but it must always agree with what the
/// codec writes - decoding with the wrong adapter fails with a format
/// mismatch rather than producing garbage.
#[derive(Clone)]
pub struct FileOptions {
    /// Root folder for the collection.
    pub folder_path: PathBuf,

    /// Physical layout: one file for the collection, or one per object.
    pub storage: FileStorageType,

    /// Serialization/compression adapter for all payloads.
    pub codec: Arc<dyn StreamCodec>,

    /// Explicit file extension; `None` uses the codec's default.
    pub file_extension: Option<String>,

    /// How long a commit waits for the collection lock before failing.
    pub lock_timeout: Duration,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            folder_path: PathBuf::from("."),
            storage: FileStorageType::SingleFile,
            codec: Arc::new(JsonCodec::new()),
            file_extension: None,
            lock_timeout: Duration::from_secs(10),
        }
    }
}

impl FileOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the collection's root folder.
    #[must_use]
    pub fn folder_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.folder_path = path.into();
        self
    }

    /// Sets the physical layout.
    #[must_use]
    pub const fn storage(mut self, storage: FileStorageType) -> Self {
        self.storage = storage;
        self
    }

    /// Sets the stream codec.
    #[must_use]
    pub fn codec(mut self, codec: impl StreamCodec + 'static) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Overrides the file extension.
    #[must_use]
    pub fn file_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = Some(extension.into());
        self
    }

    /// Sets the lock acquisition timeout.
    #[must_use]
    pub const fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// The extension actually used on disk.
    #[must_use]
    pub fn effective_extension(&self) -> String {
        self.file_extension
            .clone()
            .unwrap_or_else(|| self.codec.extension().to_string())
    }

    /// Validates the configuration.
    pub(crate) fn validate(&self) -> RepoResult<()> {
        let ext = self.effective_extension();
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(RepoError::config(format!(
                "file extension must start with a dot and name a suffix, got {ext:?}"
            )));
        }
        if ext.contains(std::path::is_separator) || ext.contains('~') {
            return Err(RepoError::config(format!(
                "file extension contains path or key-separator characters: {ext:?}"
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for FileOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileOptions")
            .field("folder_path", &self.folder_path)
            .field("storage", &self.storage)
            .field("file_extension", &self.effective_extension())
            .field("lock_timeout", &self.lock_timeout)
            .finish_non_exhaustive()
    }
}
