//! Cooperative locking of collection addresses.
//!
//! A commit holds exclusive access to one collection address across both
//! threads and OS processes. Two layers enforce this, both keyed by the
//! canonical address:
//!
//! 1. a process-wide registry of held addresses, because POSIX advisory
//!    locks are owned per process and would let two threads of one process
//!    both pass the OS lock;
//! 2. an `fs2` exclusive lock on `⟨folder⟩/⟨name⟩.lock`, which the OS
//!    releases when the holding process dies, so a crashed holder never
//!    wedges the collection.
//!
//! Acquisition waits with a short sleep backoff up to a configured deadline
//! and then fails with [`StorageError::LockTimeout`]. Locks are not
//! reentrant: a holder re-acquiring its own address times out.

use crate::address::CollectionAddress;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Sleep between acquisition attempts.
const RETRY_INTERVAL: Duration = Duration::from_millis(10);

fn registry() -> &'static Mutex<HashSet<String>> {
    static REGISTRY: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Acquires exclusive locks on collection addresses.
#[derive(Debug, Default)]
pub struct LockManager;

impl LockManager {
    /// Acquires the exclusive lock for `address`, waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::LockTimeout`] when the address stays held by
    /// another owner past the deadline, or [`StorageError::Io`] when the
    /// lock file cannot be created.
    pub fn acquire(
        address: &CollectionAddress,
        timeout: Duration,
    ) -> StorageResult<LockHandle> {
        let key = address.canonical();
        let lock_path = address.lock_path();
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let start = Instant::now();
        loop {
            if registry().lock().insert(key.clone()) {
                // In-process slot held; now contend with other processes.
                let file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .truncate(false)
                    .open(&lock_path)?;

                match file.try_lock_exclusive() {
                    Ok(()) => {
                        tracing::debug!(address = %key, waited = ?start.elapsed(), "collection lock acquired");
                        return Ok(LockHandle {
                            key,
                            _file: file,
                        });
                    }
                    Err(e) if e.kind() == ErrorKind::WouldBlock => {
                        registry().lock().remove(&key);
                    }
                    Err(e) => {
                        registry().lock().remove(&key);
                        return Err(StorageError::Io(e));
                    }
                }
            }

            let waited = start.elapsed();
            if waited >= timeout {
                tracing::debug!(address = %key, ?waited, "collection lock timed out");
                return Err(StorageError::LockTimeout {
                    address: key,
                    waited,
                });
            }
            std::thread::sleep(RETRY_INTERVAL.min(timeout - waited));
        }
    }
}

/// A scoped, exclusive lock on one collection address.
///
/// Both layers are released on drop, on every exit path including panics;
/// a handle is never left dangling.
#[derive(Debug)]
pub struct LockHandle {
    key: String,
    /// Closing the file releases the OS lock even if unlock fails.
    _file: File,
}

impl LockHandle {
    /// The canonical address this handle guards.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.key
    }
}

impl Drop for LockHandle {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self._file);
        registry().lock().remove(&self.key);
        tracing::debug!(address = %self.key, "collection lock released");
    }
}
