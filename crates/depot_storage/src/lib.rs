//! # Depot Storage
//!
//! Physical file layouts and collection locking for Depot.
//!
//! This crate owns how a logical collection maps onto files and performs the
//! raw byte-level persistence. It never interprets payloads - serialization
//! belongs to `depot_codec`, identity to `depot_core`.
//!
//! ## Design principles
//!
//! - Payloads are opaque byte blobs
//! - Every write is an atomic replace (temp file + rename), so readers see
//!   whole files only
//! - One advisory lock per collection address serializes commits across
//!   threads and processes
//!
//! ## Layouts
//!
//! - [`SingleFileStore`] - whole collection in `⟨folder⟩/⟨name⟩⟨ext⟩`
//! - [`FilePerObjectStore`] - one file per object in `⟨folder⟩/⟨name⟩/`

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod address;
mod atomic;
mod error;
mod key_code;
mod layout;
mod lock;
mod per_object;
mod single_file;

pub use address::CollectionAddress;
pub use atomic::replace_file;
pub use error::{StorageError, StorageResult};
pub use key_code::KeyCode;
pub use layout::FileStorageType;
pub use lock::{LockHandle, LockManager};
pub use per_object::{FilePerObjectStore, BACKUP_DIR};
pub use single_file::SingleFileStore;
