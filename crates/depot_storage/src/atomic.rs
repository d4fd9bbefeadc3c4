//! Crash-safe file replacement.
//!
//! All data writes go through write-then-rename: the payload lands in a
//! temporary file in the same directory, is synced, and is renamed over the
//! target. A reader therefore sees either the old file or the new one, never
//! a truncated mix, and a crash mid-write leaves the previous state intact.

use crate::error::StorageResult;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Suffix of in-flight temporary files. Writers run under the collection
/// lock, so a fixed suffix per target cannot collide.
const TEMP_SUFFIX: &str = ".tmp";

/// Atomically replaces `path` with `bytes`.
pub fn replace_file(path: &Path, bytes: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut temp = path.as_os_str().to_owned();
    temp.push(TEMP_SUFFIX);
    let temp = Path::new(&temp);

    let mut file = File::create(temp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);

    fs::rename(temp, path)?;

    if let Some(parent) = path.parent() {
        sync_dir(parent)?;
    }

    Ok(())
}

/// Fsyncs a directory so renames and deletions within it are durable.
///
/// Windows NTFS journals metadata, so the explicit sync is Unix-only.
#[cfg(unix)]
pub fn sync_dir(path: &Path) -> StorageResult<()> {
    let dir = File::open(path)?;
    dir.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
pub fn sync_dir(_path: &Path) -> StorageResult<()> {
    Ok(())
}
