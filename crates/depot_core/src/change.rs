//! The pending change set buffered between commits.

use crate::error::RepoResult;
use crate::key::Key;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// How a structured fragment combines with the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// The fragment substitutes the addressed value wholesale.
    Replace,
    /// JSON objects merge member-wise, recursing into nested objects;
    /// scalars and arrays take the fragment's value (last writer wins).
    #[default]
    Merge,
}

/// One deferred partial update. Buffering never fails; patches are resolved
/// at commit time where errors can surface as commit failures.
pub(crate) enum Patch<T> {
    /// An in-language field update.
    With(Box<dyn FnOnce(&mut T) + Send>),
    /// A structured fragment merged into the current value.
    Fragment {
        fragment: Value,
        policy: MergePolicy,
    },
}

impl<T: Serialize + DeserializeOwned> Patch<T> {
    /// Applies this patch to a value.
    pub(crate) fn apply(self, value: &mut T) -> RepoResult<()> {
        match self {
            Self::With(f) => {
                f(value);
                Ok(())
            }
            Self::Fragment { fragment, policy } => {
                let current = serde_json::to_value(&*value).map_err(encode_err)?;
                let merged = merge_value(current, fragment, policy);
                *value = serde_json::from_value(merged).map_err(mismatch_err)?;
                Ok(())
            }
        }
    }
}

/// A buffered intent for one key.
pub(crate) enum Change<T> {
    /// Insert or whole-value update, plus any patches buffered after it.
    /// Applies without reading existing state.
    Put {
        value: T,
        patches: Vec<Patch<T>>,
    },
    /// Partial updates only; the current stored value is loaded at commit.
    Patch(Vec<Patch<T>>),
    /// Deletion; absent keys delete as a no-op.
    Delete,
}

/// In-memory mapping from key to buffered change, last write wins per key.
pub(crate) struct ChangeSet<T> {
    changes: BTreeMap<Key, Change<T>>,
    clear_all: bool,
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            changes: BTreeMap::new(),
            clear_all: false,
        }
    }
}

impl<T> ChangeSet<T> {
    /// Buffers an insert or whole-value update.
    pub fn put(&mut self, key: Key, value: T) {
        self.changes.insert(
            key,
            Change::Put {
                value,
                patches: Vec::new(),
            },
        );
    }

    /// Buffers a partial update.
    ///
    /// Landing on a buffered `Put` the patch chains onto the buffered value;
    /// landing on a buffered `Delete` it overrides the delete (later entries
    /// for the same key win).
    pub fn patch(&mut self, key: Key, patch: Patch<T>) {
        match self.changes.get_mut(&key) {
            Some(Change::Put { patches, .. }) | Some(Change::Patch(patches)) => {
                patches.push(patch);
            }
            Some(slot @ Change::Delete) => {
                *slot = Change::Patch(vec![patch]);
            }
            None => {
                self.changes.insert(key, Change::Patch(vec![patch]));
            }
        }
    }

    /// Marks a key for deletion. Committing a delete for an absent key is a
    /// no-op, so bulk removals stay idempotent.
    pub fn delete(&mut self, key: Key) {
        self.changes.insert(key, Change::Delete);
    }

    /// Drops every buffered change and marks the whole collection for
    /// clearing at the next commit.
    pub fn clear_all(&mut self) {
        self.changes.clear();
        self.clear_all = true;
    }

    /// Whether a commit would do nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && !self.clear_all
    }

    /// Number of buffered per-key changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Consumes the buffer for a commit attempt.
    pub fn take(&mut self) -> (BTreeMap<Key, Change<T>>, bool) {
        let clear = std::mem::replace(&mut self.clear_all, false);
        (std::mem::take(&mut self.changes), clear)
    }
}

/// Merges `fragment` into `current` under `policy`.
pub(crate) fn merge_value(current: Value, fragment: Value, policy: MergePolicy) -> Value {
    match policy {
        MergePolicy::Replace => fragment,
        MergePolicy::Merge => match (current, fragment) {
            (Value::Object(mut current), Value::Object(fragment)) => {
                for (name, incoming) in fragment {
                    let merged = match current.remove(&name) {
                        Some(existing) => merge_value(existing, incoming, MergePolicy::Merge),
                        None => incoming,
                    };
                    current.insert(name, merged);
                }
                Value::Object(current)
            }
            (_, fragment) => fragment,
        },
    }
}

fn encode_err(e: serde_json::Error) -> crate::error::RepoError {
    depot_codec::CodecError::encode(e.to_string()).into()
}

fn mismatch_err(e: serde_json::Error) -> crate::error::RepoError {
    depot_codec::CodecError::format_mismatch(e.to_string()).into()
}
