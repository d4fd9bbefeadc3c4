//! Composite object keys and their file-name encoding.
//!
//! A [`Key`] is an ordered, fixed-arity sequence of scalar [`KeyPart`]s.
//! Equality is component-wise and type-aware: the text part `"1"` never
//! equals the integer part `1`. Keys hash and order consistently, so they
//! serve directly as map indices.
//!
//! For the per-object layout each key encodes to a deterministic,
//! filesystem-safe file-name stem: one type-tag character per part, the
//! payload percent-escaped outside `[A-Za-z0-9._-]`, parts joined by `~`.
//! The encoding is reversible, so a directory listing recovers every key
//! without touching payloads.

use crate::error::{RepoError, RepoResult};
use depot_storage::KeyCode;
use std::fmt::{self, Write as _};
use uuid::Uuid;

/// One scalar component of a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    /// A text component.
    Text(String),
    /// A signed integer component.
    Int(i64),
    /// A boolean component.
    Bool(bool),
    /// A UUID component.
    Uuid(Uuid),
}

impl KeyPart {
    fn tag(&self) -> char {
        match self {
            Self::Text(_) => 's',
            Self::Int(_) => 'i',
            Self::Bool(_) => 'b',
            Self::Uuid(_) => 'u',
        }
    }

    fn encode_into(&self, out: &mut String) {
        out.push(self.tag());
        match self {
            Self::Text(s) => escape_into(s, out),
            Self::Int(n) => {
                let _ = write!(out, "{n}");
            }
            Self::Bool(v) => {
                let _ = write!(out, "{v}");
            }
            Self::Uuid(u) => {
                let _ = write!(out, "{u}");
            }
        }
    }

    fn parse(code: &str) -> Option<Self> {
        let tag = code.chars().next()?;
        let payload = &code[tag.len_utf8()..];
        match tag {
            's' => Some(Self::Text(unescape(payload)?)),
            'i' => payload.parse().ok().map(Self::Int),
            'b' => payload.parse().ok().map(Self::Bool),
            'u' => payload.parse().ok().map(Self::Uuid),
            _ => None,
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Uuid(u) => write!(f, "{u}"),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for KeyPart {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for KeyPart {
    fn from(n: i32) -> Self {
        Self::Int(n.into())
    }
}

impl From<u32> for KeyPart {
    fn from(n: u32) -> Self {
        Self::Int(n.into())
    }
}

impl From<bool> for KeyPart {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Uuid> for KeyPart {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

/// An ordered tuple of scalar values uniquely identifying one object within
/// a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Vec<KeyPart>);

impl Key {
    /// A single-component key.
    pub fn single(part: impl Into<KeyPart>) -> Self {
        Self(vec![part.into()])
    }

    /// A two-component key.
    pub fn pair(a: impl Into<KeyPart>, b: impl Into<KeyPart>) -> Self {
        Self(vec![a.into(), b.into()])
    }

    /// A key of arbitrary arity. Extractors must produce at least one part.
    #[must_use]
    pub fn composite(parts: Vec<KeyPart>) -> Self {
        debug_assert!(!parts.is_empty(), "keys have arity >= 1");
        Self(parts)
    }

    /// The components of this key, in order.
    #[must_use]
    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    /// Number of components.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    /// Encodes this key as a filesystem-safe file-name stem.
    #[must_use]
    pub fn code(&self) -> KeyCode {
        let mut out = String::new();
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                out.push('~');
            }
            part.encode_into(&mut out);
        }
        KeyCode::new(out)
    }

    /// Decodes a file-name stem back into a key.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::InvalidKeyCode`] for stems this crate did not
    /// produce.
    pub fn from_code(code: &KeyCode) -> RepoResult<Self> {
        let stem = code.as_str();
        if stem.is_empty() {
            return Err(RepoError::invalid_key_code(stem));
        }
        let parts = stem
            .split('~')
            .map(KeyPart::parse)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| RepoError::invalid_key_code(stem))?;
        Ok(Self(parts))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [part] = self.parts() {
            return write!(f, "{part}");
        }
        f.write_char('(')?;
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{part}")?;
        }
        f.write_char(')')
    }
}

impl From<KeyPart> for Key {
    fn from(part: KeyPart) -> Self {
        Self(vec![part])
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::single(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::single(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Self::single(n)
    }
}

impl From<i32> for Key {
    fn from(n: i32) -> Self {
        Self::single(n)
    }
}

impl From<Uuid> for Key {
    fn from(u: Uuid) -> Self {
        Self::single(u)
    }
}

impl<A: Into<KeyPart>, B: Into<KeyPart>> From<(A, B)> for Key {
    fn from((a, b): (A, B)) -> Self {
        Self::pair(a, b)
    }
}

impl<A: Into<KeyPart>, B: Into<KeyPart>, C: Into<KeyPart>> From<(A, B, C)> for Key {
    fn from((a, b, c): (A, B, C)) -> Self {
        Self(vec![a.into(), b.into(), c.into()])
    }
}

fn escape_into(text: &str, out: &mut String) {
    for b in text.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => out.push(b as char),
            _ => {
                let _ = write!(out, "%{b:02X}");
            }
        }
    }
}

fn unescape(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_key_round_trip() {
        let key = Key::single("hello");
        let decoded = Key::from_code(&key.code()).unwrap();
        assert_eq!(decoded, key);
    }

    #[test]
    fn composite_key_round_trip() {
        let key = Key::composite(vec![
            KeyPart::Text("key".into()),
            KeyPart::Int(-7),
            KeyPart::Bool(true),
            KeyPart::Uuid(Uuid::nil()),
        ]);
        let code = key.code();
        assert_eq!(Key::from_code(&code).unwrap(), key);
    }

    #[test]
    fn unsafe_characters_are_escaped() {
        let key = Key::single("a/b c~d%e");
        let code = key.code();
        assert!(!code.as_str().contains('/'));
        assert!(!code.as_str().contains(' '));
        // The separator only ever appears between parts.
        assert!(!code.as_str().contains('~'));
        assert_eq!(Key::from_code(&code).unwrap(), key);
    }

    #[test]
    fn pair_separator_is_unambiguous() {
        let a = Key::pair("x~y", "z");
        let b = Key::pair("x", "y~z");
        assert_ne!(a.code(), b.code());
    }

    #[test]
    fn mixed_types_are_distinct() {
        assert_ne!(Key::single("1"), Key::single(1i64));
        assert_ne!(Key::single("1").code(), Key::single(1i64).code());
    }

    #[test]
    fn malformed_codes_fail() {
        for bad in ["", "x5", "iNaN", "bmaybe", "unot-a-uuid"] {
            let result = Key::from_code(&depot_storage::KeyCode::new(bad));
            assert!(
                matches!(result, Err(RepoError::InvalidKeyCode { .. })),
                "code {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn tuple_conversions() {
        let key: Key = ("key", "value").into();
        assert_eq!(key.arity(), 2);
        assert_eq!(key, Key::pair("key", "value"));
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(Key::single("a").to_string(), "a");
        assert_eq!(Key::pair("a", 1i64).to_string(), "(a, 1)");
    }
}
