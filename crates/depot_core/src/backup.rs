//! Dated backup snapshots.
//!
//! A snapshot copies every current file of a collection into
//! `⟨root⟩/backup/⟨yyyyMMdd⟩/`. Snapshots are idempotent per calendar day:
//! re-running on the same date overwrites the copies in place instead of
//! erroring or accumulating versions.

use crate::error::RepoResult;
use chrono::Local;
use depot_storage::{StorageError, BACKUP_DIR};
use std::fs;
use std::path::{Path, PathBuf};

/// Today's date stamp, `yyyyMMdd`.
pub(crate) fn today() -> String {
    Local::now().format("%Y%m%d").to_string()
}

/// Copies `files` into `⟨root⟩/backup/⟨date⟩/`, creating the destination as
/// needed, and returns the snapshot directory.
pub(crate) fn snapshot(files: &[PathBuf], root: &Path, date: &str) -> RepoResult<PathBuf> {
    let dest = root.join(BACKUP_DIR).join(date);
    fs::create_dir_all(&dest).map_err(StorageError::from)?;

    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        fs::copy(file, dest.join(name)).map_err(StorageError::from)?;
    }

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn snapshot_copies_files_into_dated_dir() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data.json");
        fs::write(&data, b"[1]").unwrap();

        let dest = snapshot(&[data], dir.path(), "20260830").unwrap();

        assert_eq!(dest, dir.path().join("backup").join("20260830"));
        assert_eq!(fs::read(dest.join("data.json")).unwrap(), b"[1]");
    }

    #[test]
    fn same_day_snapshot_overwrites_in_place() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data.json");

        fs::write(&data, b"old").unwrap();
        snapshot(&[data.clone()], dir.path(), "20260830").unwrap();

        fs::write(&data, b"new").unwrap();
        let dest = snapshot(&[data], dir.path(), "20260830").unwrap();

        assert_eq!(fs::read(dest.join("data.json")).unwrap(), b"new");
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 1);
    }

    #[test]
    fn empty_collection_still_creates_snapshot_dir() {
        let dir = tempdir().unwrap();
        let dest = snapshot(&[], dir.path(), "20260830").unwrap();
        assert!(dest.is_dir());
    }

    #[test]
    fn today_is_eight_digits() {
        let stamp = today();
        assert_eq!(stamp.len(), 8);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
    }
}
