//! In-memory repository for tests and ephemeral use.

use crate::change::{Change, ChangeSet, MergePolicy, Patch};
use crate::error::{RepoError, RepoResult};
use crate::file::KeyFn;
use crate::key::Key;
use crate::repository::Repository;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A repository holding its committed state in memory.
///
/// Shares the pending-change semantics of [`crate::FileRepository`] - same
/// buffering, same last-write-wins batching, same patch resolution - without
/// touching the file system or any lock. Commit is trivially atomic. Useful
/// anywhere a test needs repository behavior without disk.
pub struct MemoryRepository<T> {
    key_of: KeyFn<T>,
    committed: BTreeMap<Key, T>,
    pending: ChangeSet<T>,
}

impl<T: Clone + Serialize + DeserializeOwned> MemoryRepository<T> {
    /// Creates an empty in-memory repository with the given key extractor.
    pub fn new<F, K>(key_of: F) -> Self
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        K: Into<Key>,
    {
        Self {
            key_of: Arc::new(move |value| key_of(value).into()),
            committed: BTreeMap::new(),
            pending: ChangeSet::default(),
        }
    }

    /// The committed keys, in key order.
    #[must_use]
    pub fn keys(&self) -> Vec<Key> {
        self.committed.keys().cloned().collect()
    }
}

impl<T: Clone + Serialize + DeserializeOwned> Repository<T> for MemoryRepository<T> {
    fn insert(&mut self, value: T) {
        let key = (self.key_of)(&value);
        self.pending.put(key, value);
    }

    fn remove(&mut self, value: &T) {
        self.remove_by_key((self.key_of)(value));
    }

    fn remove_by_key(&mut self, key: Key) {
        self.pending.delete(key);
    }

    fn remove_all(&mut self) {
        self.pending.clear_all();
    }

    fn update(&mut self, key: Key, value: T) {
        self.pending.put(key, value);
    }

    fn update_with(&mut self, key: Key, f: impl FnOnce(&mut T) + Send + 'static) {
        self.pending.patch(key, Patch::With(Box::new(f)));
    }

    fn merge_fragment(&mut self, key: Key, fragment: serde_json::Value, policy: MergePolicy) {
        self.pending.patch(key, Patch::Fragment { fragment, policy });
    }

    fn exists(&self, key: &Key) -> RepoResult<bool> {
        Ok(self.committed.contains_key(key))
    }

    fn find(&self, key: &Key) -> RepoResult<Option<T>> {
        Ok(self.committed.get(key).cloned())
    }

    fn items(&self) -> RepoResult<Vec<T>> {
        Ok(self.committed.values().cloned().collect())
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }

    fn save_changes(&mut self) -> RepoResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let (changes, clear) = self.pending.take();
        if clear {
            self.committed.clear();
        }

        let result = (|| {
            for (key, change) in changes {
                match change {
                    Change::Put { value, patches } => {
                        let mut value = value;
                        for patch in patches {
                            patch.apply(&mut value)?;
                        }
                        self.committed.insert(key, value);
                    }
                    Change::Delete => {
                        self.committed.remove(&key);
                    }
                    Change::Patch(patches) => {
                        let value = self
                            .committed
                            .get_mut(&key)
                            .ok_or_else(|| RepoError::not_found(&key))?;
                        for patch in patches {
                            patch.apply(value)?;
                        }
                    }
                }
            }
            Ok(())
        })();

        result.map_err(RepoError::commit)
    }
}
