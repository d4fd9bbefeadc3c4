//! The repository capability set.

use crate::change::MergePolicy;
use crate::error::{RepoError, RepoResult};
use crate::key::Key;
use serde_json::Value;

/// A key-addressed object store.
///
/// Mutations (`insert`, `update*`, `remove*`) only touch the in-memory
/// pending change set; nothing reaches disk until [`save_changes`] commits
/// the whole batch under the collection lock. Within one uncommitted batch
/// the last change per key wins.
///
/// Reads (`exists`, `find`, `get`, `items`, `count`) bypass the pending set
/// and observe the current committed state without taking the lock.
///
/// Implemented by [`crate::FileRepository`] (file-system backed) and
/// [`crate::MemoryRepository`] (in-memory, for tests); backends are
/// swappable variants of one capability set, not an inheritance hierarchy.
///
/// [`save_changes`]: Repository::save_changes
pub trait Repository<T> {
    /// Buffers an insert of `value`, keyed by the extracted key.
    fn insert(&mut self, value: T);

    /// Buffers inserts for every value.
    fn insert_many<I: IntoIterator<Item = T>>(&mut self, values: I) {
        for value in values {
            self.insert(value);
        }
    }

    /// Buffers removal of `value`, using its extracted key.
    fn remove(&mut self, value: &T);

    /// Buffers removal of the object stored under `key`.
    ///
    /// Committing a removal for an absent key is a no-op, not an error.
    fn remove_by_key(&mut self, key: Key);

    /// Buffers removals for every key.
    fn remove_all_by_key<I: IntoIterator<Item = Key>>(&mut self, keys: I) {
        for key in keys {
            self.remove_by_key(key);
        }
    }

    /// Buffers clearing of the whole collection.
    fn remove_all(&mut self);

    /// Buffers a whole-value update for `key`.
    fn update(&mut self, key: Key, value: T);

    /// Buffers a field update for `key`, applied to the stored value at
    /// commit time. Fails the commit with `NotFound` if no record exists.
    fn update_with(&mut self, key: Key, f: impl FnOnce(&mut T) + Send + 'static);

    /// Buffers a structured partial update: `fragment` is merged into the
    /// stored value under `policy` at commit time, atomically with respect
    /// to the object's other fields.
    fn merge_fragment(&mut self, key: Key, fragment: Value, policy: MergePolicy);

    /// Whether a committed record exists for `key`.
    fn exists(&self, key: &Key) -> RepoResult<bool>;

    /// Reads the committed record for `key`, if any.
    fn find(&self, key: &Key) -> RepoResult<Option<T>>;

    /// Reads the committed record for `key`, failing with
    /// [`RepoError::NotFound`] when absent.
    fn get(&self, key: &Key) -> RepoResult<T> {
        self.find(key)?.ok_or_else(|| RepoError::not_found(key))
    }

    /// Reads the whole committed collection. Each call re-reads current
    /// state; uncommitted changes are never visible.
    fn items(&self) -> RepoResult<Vec<T>>;

    /// Number of committed records.
    fn count(&self) -> RepoResult<usize> {
        Ok(self.items()?.len())
    }

    /// Number of changes waiting in the pending set.
    fn pending(&self) -> usize;

    /// Commits every buffered change, in order, under the collection lock,
    /// then clears the pending set.
    ///
    /// # Errors
    ///
    /// [`RepoError::Storage`] with a lock timeout when exclusive access
    /// cannot be acquired in time (the commit never starts), or
    /// [`RepoError::Commit`] wrapping whatever failed once it has.
    fn save_changes(&mut self) -> RepoResult<()>;
}
