//! File-name stems derived from object keys.

/// A deterministic, filesystem-safe encoding of an object key.
///
/// The per-object layout names each file `<code><ext>`. Codes are produced
/// by `depot_core` (which owns the typed `Key`); this crate only treats them
/// as opaque file-name stems, so the storage layer never needs to understand
/// key structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(String);

impl KeyCode {
    /// Wraps an already-encoded stem.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// The stem as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KeyCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for KeyCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}
