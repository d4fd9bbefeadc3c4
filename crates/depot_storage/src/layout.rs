//! Physical layout selection.

/// How a logical collection maps onto physical files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileStorageType {
    /// The entire collection serializes to one file, replaced atomically on
    /// every commit. Commits are all-or-nothing.
    #[default]
    SingleFile,
    /// Each object serializes to its own file named by its encoded key.
    /// Commits are best-effort per file.
    FilePerObject,
}
