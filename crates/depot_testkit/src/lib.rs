//! # Depot Testkit
//!
//! Test utilities for Depot.
//!
//! This crate provides:
//! - Test fixtures and pre-wired repositories over temp directories
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use depot_core::Repository;
//! use depot_testkit::prelude::*;
//!
//! let mut repo = TestRepo::single_file();
//! repo.insert(TestItem::new("key", "value"));
//! repo.save_changes().unwrap();
//! assert_eq!(repo.count().unwrap(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
