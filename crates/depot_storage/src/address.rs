//! Collection addresses.

use std::path::{Path, PathBuf};

/// The on-disk identity of one logical collection: a folder plus a name.
///
/// Two repository instances that resolve to the same canonical address
/// contend for the same files and are serialized by the
/// [`crate::LockManager`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionAddress {
    folder: PathBuf,
    name: String,
}

impl CollectionAddress {
    /// Creates an address for `name` rooted at `folder`.
    pub fn new(folder: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            name: name.into(),
        }
    }

    /// The root folder of the collection.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A canonical string form used as the lock-registry key.
    ///
    /// The folder is made absolute lexically so that relative and absolute
    /// spellings of the same location collide; the folder does not need to
    /// exist yet.
    #[must_use]
    pub fn canonical(&self) -> String {
        let folder = std::path::absolute(&self.folder).unwrap_or_else(|_| self.folder.clone());
        format!("{}::{}", folder.display(), self.name)
    }

    /// Path of the monolithic data file for the given extension.
    #[must_use]
    pub fn data_file(&self, extension: &str) -> PathBuf {
        self.folder.join(format!("{}{}", self.name, extension))
    }

    /// Directory holding per-object files.
    #[must_use]
    pub fn object_dir(&self) -> PathBuf {
        self.folder.join(&self.name)
    }

    /// Path of the advisory lock file.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.folder.join(format!("{}.lock", self.name))
    }
}

impl std::fmt::Display for CollectionAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.folder.display(), self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_derived_from_folder_and_name() {
        let addr = CollectionAddress::new("/tmp/data", "tasks");

        assert_eq!(addr.data_file(".json"), PathBuf::from("/tmp/data/tasks.json"));
        assert_eq!(addr.object_dir(), PathBuf::from("/tmp/data/tasks"));
        assert_eq!(addr.lock_path(), PathBuf::from("/tmp/data/tasks.lock"));
    }

    #[test]
    fn canonical_distinguishes_names_in_one_folder() {
        let a = CollectionAddress::new("/tmp/data", "a");
        let b = CollectionAddress::new("/tmp/data", "b");
        assert_ne!(a.canonical(), b.canonical());
    }

    #[test]
    fn canonical_is_stable_for_equal_addresses() {
        let a = CollectionAddress::new("/tmp/data", "tasks");
        let b = CollectionAddress::new("/tmp/data", "tasks");
        assert_eq!(a.canonical(), b.canonical());
    }
}
