//! # Depot Core
//!
//! A generic, key-addressed persistence layer for plain domain objects on
//! the local file system.
//!
//! This crate provides:
//! - Composite keys ([`Key`], [`KeyPart`]) with deterministic file-name
//!   encoding
//! - The [`Repository`] capability set, buffering changes in memory and
//!   committing them as a batch
//! - [`FileRepository`], persisting via either a single collection file or
//!   one file per object, serialized through a pluggable codec
//! - [`MemoryRepository`] for tests
//! - Dated, idempotent backup snapshots
//!
//! Commits hold an advisory lock on the collection address, so multiple
//! threads and OS processes can safely share one collection on a single
//! machine. Distributed/multi-host consistency is out of scope.
//!
//! ## Example
//!
//! ```no_run
//! use depot_core::{FileOptions, FileRepository, FileStorageType, Repository};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct User { org: String, login: String }
//!
//! // Composite key: (org, login).
//! let mut users: FileRepository<User> = FileRepository::new(
//!     "users",
//!     |u: &User| (u.org.clone(), u.login.clone()),
//!     FileOptions::new()
//!         .folder_path("data")
//!         .storage(FileStorageType::FilePerObject),
//! )?;
//!
//! users.insert(User { org: "acme".into(), login: "alice".into() });
//! users.save_changes()?;
//! # Ok::<(), depot_core::RepoError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backup;
mod change;
mod error;
mod file;
mod key;
mod memory;
mod options;
mod repository;

pub use change::MergePolicy;
pub use error::{RepoError, RepoResult};
pub use file::{FileRepository, KeyFn};
pub use key::{Key, KeyPart};
pub use memory::MemoryRepository;
pub use options::FileOptions;
pub use repository::Repository;

// Collaborator types callers configure or match on.
pub use depot_codec::{CodecError, GzipCodec, JsonCodec, StreamCodec};
pub use depot_storage::{CollectionAddress, FileStorageType, StorageError};
