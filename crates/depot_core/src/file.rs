//! File-system backed repository.

use crate::backup;
use crate::change::{Change, ChangeSet, MergePolicy, Patch};
use crate::error::{RepoError, RepoResult};
use crate::key::Key;
use crate::options::FileOptions;
use crate::repository::Repository;
use depot_codec::{decode, encode};
use depot_storage::{
    CollectionAddress, FilePerObjectStore, FileStorageType, LockManager, SingleFileStore,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Key extractor: a pure function from a domain object to its key.
pub type KeyFn<T> = Arc<dyn Fn(&T) -> Key + Send + Sync>;

/// The physical store behind a repository, chosen by
/// [`FileOptions::storage`].
enum Store {
    Single(SingleFileStore),
    PerObject(FilePerObjectStore),
}

/// A repository persisting objects of type `T` on the local file system.
///
/// Construction binds a collection address (folder + name) and a key
/// extractor; all mutation is buffered until [`Repository::save_changes`].
///
/// # Example
///
/// ```no_run
/// use depot_core::{FileOptions, FileRepository, Repository};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Task { id: String, done: bool }
///
/// let mut repo: FileRepository<Task> = FileRepository::new(
///     "tasks",
///     |t: &Task| t.id.clone(),
///     FileOptions::new().folder_path("data"),
/// )?;
///
/// repo.insert(Task { id: "a".into(), done: false });
/// repo.save_changes()?;
/// # Ok::<(), depot_core::RepoError>(())
/// ```
pub struct FileRepository<T> {
    address: CollectionAddress,
    options: FileOptions,
    key_of: KeyFn<T>,
    store: Store,
    pending: ChangeSet<T>,
}

impl<T: Serialize + DeserializeOwned> FileRepository<T> {
    /// Creates a repository for collection `name` with the given key
    /// extractor and options.
    ///
    /// The extractor may return anything convertible into a [`Key`]: a
    /// single scalar for simple identity, or a tuple for composite keys.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Config`] when the options are inconsistent.
    pub fn new<F, K>(name: impl Into<String>, key_of: F, options: FileOptions) -> RepoResult<Self>
    where
        F: Fn(&T) -> K + Send + Sync + 'static,
        K: Into<Key>,
    {
        options.validate()?;
        let address = CollectionAddress::new(options.folder_path.clone(), name);
        if address.folder().is_file() {
            return Err(depot_storage::StorageError::unusable_folder(
                address.folder().display().to_string(),
            )
            .into());
        }
        let extension = options.effective_extension();
        let store = match options.storage {
            FileStorageType::SingleFile => {
                Store::Single(SingleFileStore::new(&address, &extension))
            }
            FileStorageType::FilePerObject => {
                Store::PerObject(FilePerObjectStore::new(&address, &extension))
            }
        };
        Ok(Self {
            address,
            options,
            key_of: Arc::new(move |value| key_of(value).into()),
            store,
            pending: ChangeSet::default(),
        })
    }

    /// The collection address this repository is bound to.
    #[must_use]
    pub fn address(&self) -> &CollectionAddress {
        &self.address
    }

    /// The configuration in effect.
    #[must_use]
    pub fn options(&self) -> &FileOptions {
        &self.options
    }

    /// Extracts the key of `value`.
    #[must_use]
    pub fn key_of(&self, value: &T) -> Key {
        (self.key_of)(value)
    }

    /// Snapshots the collection's current files into a dated backup folder
    /// (`backup/⟨yyyyMMdd⟩/`, today's date) and returns its path.
    ///
    /// Idempotent within a day: re-invocation overwrites the same snapshot
    /// without error. Takes no commit lock - writes are atomic replaces, so
    /// a concurrent commit can never expose a torn file to the copy.
    pub fn create_backup(&self) -> RepoResult<PathBuf> {
        self.create_backup_dated(&backup::today())
    }

    /// Like [`create_backup`](Self::create_backup) with an explicit date
    /// stamp, for callers that manage their own snapshot naming.
    pub fn create_backup_dated(&self, date: &str) -> RepoResult<PathBuf> {
        let (files, root) = match &self.store {
            Store::Single(store) => (store.files()?, self.address.folder().to_path_buf()),
            Store::PerObject(store) => (store.files()?, store.dir().to_path_buf()),
        };
        let dest = backup::snapshot(&files, &root, date)?;
        tracing::debug!(collection = %self.address, dest = %dest.display(), files = files.len(), "backup created");
        Ok(dest)
    }

    /// The committed keys currently on disk.
    ///
    /// For the per-object layout this decodes file names only; for the
    /// single-file layout it loads the collection and extracts keys.
    pub fn keys(&self) -> RepoResult<Vec<Key>> {
        match &self.store {
            Store::Single(_) => {
                Ok(self.load_committed()?.iter().map(|v| (self.key_of)(v)).collect())
            }
            Store::PerObject(store) => store
                .list()?
                .iter()
                .map(|(code, _)| Key::from_code(code))
                .collect(),
        }
    }

    fn codec(&self) -> &dyn depot_codec::StreamCodec {
        self.options.codec.as_ref()
    }

    fn load_committed(&self) -> RepoResult<Vec<T>> {
        match &self.store {
            Store::Single(store) => match store.read()? {
                Some(bytes) => Ok(decode(self.codec(), &bytes)?),
                None => Ok(Vec::new()),
            },
            Store::PerObject(store) => {
                let mut out = Vec::new();
                for (code, _) in store.list()? {
                    if let Some(bytes) = store.read(&code)? {
                        out.push(decode(self.codec(), &bytes)?);
                    }
                }
                Ok(out)
            }
        }
    }

    /// Applies one batch against the monolithic file: read-modify-write with
    /// a single atomic replace at the end, so a failure anywhere leaves the
    /// previous file untouched.
    fn commit_single(
        &self,
        store: &SingleFileStore,
        changes: BTreeMap<Key, Change<T>>,
        clear: bool,
    ) -> RepoResult<()> {
        let mut items: Vec<(Key, T)> = if clear {
            Vec::new()
        } else {
            self.load_committed()?
                .into_iter()
                .map(|value| ((self.key_of)(&value), value))
                .collect()
        };

        for (key, change) in changes {
            match change {
                Change::Put { value, patches } => {
                    let mut value = value;
                    for patch in patches {
                        patch.apply(&mut value)?;
                    }
                    match items.iter_mut().find(|(k, _)| *k == key) {
                        Some((_, slot)) => *slot = value,
                        None => items.push((key, value)),
                    }
                }
                Change::Delete => items.retain(|(k, _)| *k != key),
                Change::Patch(patches) => {
                    let Some((_, value)) = items.iter_mut().find(|(k, _)| *k == key) else {
                        return Err(RepoError::not_found(&key));
                    };
                    for patch in patches {
                        patch.apply(value)?;
                    }
                }
            }
        }

        let values: Vec<&T> = items.iter().map(|(_, v)| v).collect();
        let payload = encode(self.codec(), &values)?;
        store.replace(&payload)?;
        Ok(())
    }

    /// Applies one batch file-by-file. Best effort: the first failure aborts
    /// the commit; files already written in this batch remain.
    fn commit_per_object(
        &self,
        store: &FilePerObjectStore,
        changes: BTreeMap<Key, Change<T>>,
        clear: bool,
    ) -> RepoResult<()> {
        if clear {
            store.clear()?;
        }

        for (key, change) in changes {
            let code = key.code();
            match change {
                Change::Put { value, patches } => {
                    let mut value = value;
                    for patch in patches {
                        patch.apply(&mut value)?;
                    }
                    store.write(&code, &encode(self.codec(), &value)?)?;
                }
                Change::Delete => store.delete(&code)?,
                Change::Patch(patches) => {
                    let bytes = store
                        .read(&code)?
                        .ok_or_else(|| RepoError::not_found(&key))?;
                    let mut value: T = decode(self.codec(), &bytes)?;
                    for patch in patches {
                        patch.apply(&mut value)?;
                    }
                    store.write(&code, &encode(self.codec(), &value)?)?;
                }
            }
        }
        Ok(())
    }
}

impl<T: Serialize + DeserializeOwned> Repository<T> for FileRepository<T> {
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
        match &self.store {
            Store::Single(_) => Ok(self.find(key)?.is_some()),
            Store::PerObject(store) => Ok(store.exists(&key.code())?),
        }
    }

    fn find(&self, key: &Key) -> RepoResult<Option<T>> {
        match &self.store {
            Store::Single(_) => Ok(self
                .load_committed()?
                .into_iter()
                .find(|value| (self.key_of)(value) == *key)),
            Store::PerObject(store) => match store.read(&key.code())? {
                Some(bytes) => Ok(Some(decode(self.codec(), &bytes)?)),
                None => Ok(None),
            },
        }
    }

    fn items(&self) -> RepoResult<Vec<T>> {
        self.load_committed()
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }

    fn save_changes(&mut self) -> RepoResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        // A timeout here means the commit never started; it surfaces as
        // LockTimeout, not CommitFailure.
        let _lock = LockManager::acquire(&self.address, self.options.lock_timeout)?;

        let (changes, clear) = self.pending.take();
        tracing::debug!(
            collection = %self.address,
            changes = changes.len(),
            clear,
            "committing change set"
        );

        let result = match &self.store {
            Store::Single(store) => self.commit_single(store, changes, clear),
            Store::PerObject(store) => self.commit_per_object(store, changes, clear),
        };
        result.map_err(RepoError::commit)
    }
}
