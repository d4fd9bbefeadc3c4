//! Test fixtures and repository helpers.
//!
//! Provides a small domain type and pre-wired repositories over temporary
//! directories for common test scenarios.

use depot_core::{FileOptions, FileRepository, FileStorageType, GzipCodec};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::TempDir;

/// A minimal domain object for repository tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestItem {
    /// Identity (the default single-component key).
    pub id: String,
    /// An arbitrary payload field.
    pub value: String,
    /// A numeric field for update tests.
    pub score: i64,
}

impl TestItem {
    /// Creates an item with a zero score.
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
            score: 0,
        }
    }
}

/// A test repository with automatic cleanup.
///
/// The temporary directory is kept alive alongside the repository so the
/// files survive for the duration of the test.
pub struct TestRepo {
    /// The repository under test.
    pub repo: FileRepository<TestItem>,
    _temp_dir: TempDir,
}

impl TestRepo {
    /// Builds a repository named "test" keyed by [`TestItem::id`], letting
    /// the caller adjust options (the folder path is always the temp dir).
    pub fn with_options(adjust: impl FnOnce(FileOptions) -> FileOptions) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp directory");
        let options = adjust(FileOptions::new()).folder_path(temp_dir.path());
        let repo = FileRepository::new("test", |item: &TestItem| item.id.clone(), options)
            .expect("failed to build test repository");
        Self {
            repo,
            _temp_dir: temp_dir,
        }
    }

    /// Single-file layout, plain JSON.
    pub fn single_file() -> Self {
        Self::with_options(|o| o)
    }

    /// Per-object layout, plain JSON.
    pub fn per_object() -> Self {
        Self::with_options(|o| o.storage(FileStorageType::FilePerObject))
    }

    /// Single-file layout with the gzip codec.
    pub fn gzip() -> Self {
        Self::with_options(|o| o.codec(GzipCodec::new()))
    }

    /// The collection's root folder.
    pub fn folder(&self) -> &Path {
        self._temp_dir.path()
    }
}

impl std::ops::Deref for TestRepo {
    type Target = FileRepository<TestItem>;

    fn deref(&self) -> &Self::Target {
        &self.repo
    }
}

impl std::ops::DerefMut for TestRepo {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.repo
    }
}
