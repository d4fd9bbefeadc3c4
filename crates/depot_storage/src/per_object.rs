//! Per-object layout: one file per stored object.

use crate::address::CollectionAddress;
use crate::atomic::{replace_file, sync_dir};
use crate::error::{StorageError, StorageResult};
use crate::key_code::KeyCode;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Subdirectory reserved for backup snapshots; never enumerated as data.
pub const BACKUP_DIR: &str = "backup";

/// Stores each object as its own file under `⟨folder⟩/⟨name⟩/`, named by the
/// encoded key: `⟨key-code⟩⟨ext⟩`.
///
/// Existence of an object reduces to existence of its file. Writes replace
/// individual files atomically; deletes of absent keys are no-ops.
#[derive(Debug)]
pub struct FilePerObjectStore {
    dir: PathBuf,
    extension: String,
}

impl FilePerObjectStore {
    /// Creates a store for the given address and file extension.
    #[must_use]
    pub fn new(address: &CollectionAddress, extension: &str) -> Self {
        Self {
            dir: address.object_dir(),
            extension: extension.to_string(),
        }
    }

    /// The directory holding this collection's object files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `code`.
    #[must_use]
    pub fn path_for(&self, code: &KeyCode) -> PathBuf {
        self.dir.join(format!("{}{}", code, self.extension))
    }

    /// Reads one object's payload; `None` when the key has no file.
    pub fn read(&self, code: &KeyCode) -> StorageResult<Option<Vec<u8>>> {
        match fs::read(self.path_for(code)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Writes (creates or rewrites) one object's payload atomically.
    pub fn write(&self, code: &KeyCode, bytes: &[u8]) -> StorageResult<()> {
        tracing::trace!(code = %code, len = bytes.len(), "writing object file");
        replace_file(&self.path_for(code), bytes)
    }

    /// Deletes one object's file. Missing file is a no-op.
    pub fn delete(&self, code: &KeyCode) -> StorageResult<()> {
        match fs::remove_file(self.path_for(code)) {
            Ok(()) => sync_dir(&self.dir),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Whether a file exists for `code`.
    pub fn exists(&self, code: &KeyCode) -> StorageResult<bool> {
        Ok(self.path_for(code).exists())
    }

    /// Enumerates the stored objects as `(key code, path)` pairs.
    ///
    /// Skips subdirectories (including `backup/`), in-flight temp files and
    /// anything without the configured extension. A missing collection
    /// directory is an empty collection.
    pub fn list(&self) -> StorageResult<Vec<(KeyCode, PathBuf)>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(stem) = name.strip_suffix(&self.extension) {
                if !stem.is_empty() {
                    out.push((KeyCode::new(stem), entry.path()));
                }
            }
        }
        out.sort();
        Ok(out)
    }

    /// Deletes every stored object file, leaving backups untouched.
    pub fn clear(&self) -> StorageResult<()> {
        for (_, path) in self.list()? {
            fs::remove_file(path)?;
        }
        if self.dir.exists() {
            sync_dir(&self.dir)?;
        }
        Ok(())
    }

    /// The data files currently backing this collection.
    pub fn files(&self) -> StorageResult<Vec<PathBuf>> {
        Ok(self.list()?.into_iter().map(|(_, p)| p).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &Path) -> FilePerObjectStore {
        FilePerObjectStore::new(&CollectionAddress::new(dir, "test"), ".json")
    }

    #[test]
    fn write_read_delete() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());
        let code = KeyCode::new("sa");

        assert!(!store.exists(&code).unwrap());
        store.write(&code, b"{}").unwrap();
        assert!(store.exists(&code).unwrap());
        assert_eq!(store.read(&code).unwrap().unwrap(), b"{}");

        store.delete(&code).unwrap();
        assert!(!store.exists(&code).unwrap());
        assert!(store.read(&code).unwrap().is_none());
    }

    #[test]
    fn delete_missing_is_noop() {
        let dir = tempdir().unwrap();
        store(dir.path()).delete(&KeyCode::new("sgone")).unwrap();
    }

    #[test]
    fn list_returns_one_entry_per_object() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        for code in ["sa", "sb", "sc"] {
            store.write(&KeyCode::new(code), b"{}").unwrap();
        }

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 3);
        let codes: Vec<_> = listed.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(codes, vec!["sa", "sb", "sc"]);
    }

    #[test]
    fn list_skips_backup_dir_and_foreign_files() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        store.write(&KeyCode::new("sa"), b"{}").unwrap();
        fs::create_dir_all(store.dir().join(BACKUP_DIR).join("20260830")).unwrap();
        fs::write(store.dir().join("notes.txt"), b"ignored").unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn clear_removes_data_but_keeps_backups() {
        let dir = tempdir().unwrap();
        let store = store(dir.path());

        store.write(&KeyCode::new("sa"), b"{}").unwrap();
        let backup = store.dir().join(BACKUP_DIR);
        fs::create_dir_all(&backup).unwrap();

        store.clear().unwrap();

        assert!(store.list().unwrap().is_empty());
        assert!(backup.exists());
    }

    #[test]
    fn missing_dir_lists_empty() {
        let dir = tempdir().unwrap();
        assert!(store(dir.path()).list().unwrap().is_empty());
    }
}
