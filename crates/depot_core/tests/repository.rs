//! End-to-end repository tests across layouts, codecs and backups.

use depot_core::{
    FileOptions, FileRepository, FileStorageType, GzipCodec, JsonCodec, Key, MergePolicy,
    RepoError, Repository,
};
use depot_testkit::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn insert_commit_remove_commit() {
    let mut repo = TestRepo::single_file();

    repo.insert(TestItem::new("key", "value"));
    repo.save_changes().unwrap();
    assert_eq!(repo.count().unwrap(), 1);

    let item = repo.get(&Key::single("key")).unwrap();
    repo.remove(&item);
    repo.save_changes().unwrap();
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn composite_key_round_trip() {
    let temp = TempDir::new().unwrap();
    let mut repo: FileRepository<TestItem> = FileRepository::new(
        "test",
        |i: &TestItem| (i.id.clone(), i.value.clone()),
        FileOptions::new().folder_path(temp.path()),
    )
    .unwrap();

    let obj = TestItem::new("key", "value");
    repo.insert(obj.clone());
    repo.save_changes().unwrap();
    assert_eq!(repo.count().unwrap(), 1);
    assert!(repo.exists(&Key::pair("key", "value")).unwrap());

    repo.remove(&obj);
    repo.save_changes().unwrap();
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn single_file_layout_writes_one_file() {
    let mut repo = TestRepo::single_file();
    repo.insert(TestItem::new("a", "1"));
    repo.save_changes().unwrap();

    assert!(repo.folder().join("test.json").is_file());
}

#[test]
fn per_object_layout_writes_one_file_per_key() {
    let mut repo = TestRepo::per_object();
    repo.insert_many([
        TestItem::new("a", "1"),
        TestItem::new("b", "2"),
        TestItem::new("c", "3"),
    ]);
    repo.save_changes().unwrap();

    let files: Vec<_> = fs::read_dir(repo.folder().join("test"))
        .unwrap()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().unwrap().is_file())
        .collect();
    assert_eq!(files.len(), 3);
    assert_eq!(repo.count().unwrap(), 3);
}

#[test]
fn per_object_keys_recovered_from_file_names() {
    let temp = TempDir::new().unwrap();
    let mut repo: FileRepository<TestItem> = FileRepository::new(
        "test",
        |i: &TestItem| (i.id.clone(), i.score),
        FileOptions::new()
            .folder_path(temp.path())
            .storage(FileStorageType::FilePerObject),
    )
    .unwrap();

    let mut item = TestItem::new("key with spaces", "v");
    item.score = -42;
    repo.insert(item);
    repo.save_changes().unwrap();

    let keys = repo.keys().unwrap();
    assert_eq!(keys, vec![Key::pair("key with spaces", -42i64)]);
}

#[test]
fn gzip_codec_with_custom_extension() {
    let temp = TempDir::new().unwrap();
    let mut repo: FileRepository<TestItem> = FileRepository::new(
        "test",
        |i: &TestItem| i.id.clone(),
        FileOptions::new()
            .folder_path(temp.path())
            .codec(GzipCodec::new())
            .file_extension(".txt.gz"),
    )
    .unwrap();

    let obj = TestItem::new("key", "value");
    repo.insert(obj.clone());
    repo.save_changes().unwrap();

    // The raw file decodes with the same adapter to the original collection.
    let raw = fs::read(temp.path().join("test.txt.gz")).unwrap();
    let stored: Vec<TestItem> = depot_codec::decode(&GzipCodec::new(), &raw).unwrap();
    assert_eq!(stored, vec![obj]);

    // The non-compressing adapter must refuse the payload.
    let result: Result<Vec<TestItem>, _> = depot_codec::decode(&JsonCodec::new(), &raw);
    assert!(matches!(
        result,
        Err(depot_core::CodecError::FormatMismatch { .. })
    ));
}

#[test]
fn backup_single_file_layout() {
    let mut repo = TestRepo::single_file();
    repo.insert(TestItem::new("key", "value"));
    repo.save_changes().unwrap();

    let dest = repo.create_backup_dated("20260830").unwrap();
    assert_eq!(dest, repo.folder().join("backup").join("20260830"));
    assert!(dest.join("test.json").is_file());

    // Second invocation on the same date overwrites without error.
    let dest2 = repo.create_backup_dated("20260830").unwrap();
    assert_eq!(dest2, dest);
    assert!(dest2.join("test.json").is_file());
}

#[test]
fn backup_per_object_layout() {
    let mut repo = TestRepo::per_object();
    repo.insert(TestItem::new("key", "value"));
    repo.save_changes().unwrap();

    let dest = repo.create_backup_dated("20260830").unwrap();
    assert_eq!(
        dest,
        repo.folder().join("test").join("backup").join("20260830")
    );
    assert_eq!(fs::read_dir(&dest).unwrap().count(), 1);

    repo.create_backup_dated("20260830").unwrap();
    assert_eq!(fs::read_dir(&dest).unwrap().count(), 1);

    // Backup files never show up as collection data.
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn backup_with_todays_date() {
    let mut repo = TestRepo::single_file();
    repo.insert(TestItem::new("key", "value"));
    repo.save_changes().unwrap();

    let dest = repo.create_backup().unwrap();
    assert!(dest.is_dir());
    assert!(fs::read_dir(&dest).unwrap().next().is_some());
}

#[test]
fn duplicate_key_yields_single_record() {
    for mut repo in [TestRepo::single_file(), TestRepo::per_object()] {
        repo.insert(TestItem::new("key", "first"));
        repo.insert(TestItem::new("key", "second"));
        repo.save_changes().unwrap();

        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.get(&Key::single("key")).unwrap().value, "second");

        // Re-inserting after commit still converges to one record.
        repo.insert(TestItem::new("key", "third"));
        repo.save_changes().unwrap();
        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.get(&Key::single("key")).unwrap().value, "third");
    }
}

#[test]
fn failed_commit_leaves_disk_unchanged() {
    let mut repo = TestRepo::single_file();
    repo.insert(TestItem::new("a", "committed"));
    repo.save_changes().unwrap();

    let path = repo.folder().join("test.json");
    let before = fs::read(&path).unwrap();

    // A patch on a missing key fails the whole commit.
    repo.insert(TestItem::new("b", "never-lands"));
    repo.update_with(Key::single("missing"), |i| i.score = 1);
    let err = repo.save_changes().unwrap_err();
    assert!(matches!(err, RepoError::Commit { .. }));

    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn update_variants_on_file_repo() {
    for mut repo in [TestRepo::single_file(), TestRepo::per_object()] {
        repo.insert(TestItem::new("key", "old"));
        repo.save_changes().unwrap();

        // Whole-value replace.
        repo.update(Key::single("key"), TestItem::new("key", "replaced"));
        repo.save_changes().unwrap();
        assert_eq!(repo.get(&Key::single("key")).unwrap().value, "replaced");

        // Field update.
        repo.update_with(Key::single("key"), |i| i.score = 5);
        repo.save_changes().unwrap();
        assert_eq!(repo.get(&Key::single("key")).unwrap().score, 5);

        // Fragment merge keeps the other fields.
        repo.merge_fragment(
            Key::single("key"),
            json!({"value": "merged"}),
            MergePolicy::Merge,
        );
        repo.save_changes().unwrap();
        let stored = repo.get(&Key::single("key")).unwrap();
        assert_eq!(stored.value, "merged");
        assert_eq!(stored.score, 5);
    }
}

#[test]
fn items_reread_committed_state() {
    let mut repo = TestRepo::single_file();
    repo.insert(TestItem::new("a", "1"));
    repo.save_changes().unwrap();

    // Pending changes are never visible through items().
    repo.insert(TestItem::new("b", "2"));
    assert_eq!(repo.items().unwrap().len(), 1);

    repo.save_changes().unwrap();
    assert_eq!(repo.items().unwrap().len(), 2);
    // Restartable: a fresh enumeration sees current state again.
    assert_eq!(repo.items().unwrap().len(), 2);
}

#[test]
fn remove_by_key_missing_is_noop() {
    for mut repo in [TestRepo::single_file(), TestRepo::per_object()] {
        repo.insert(TestItem::new("a", "1"));
        repo.save_changes().unwrap();

        repo.remove_by_key(Key::single("ghost"));
        repo.save_changes().unwrap();
        assert_eq!(repo.count().unwrap(), 1);
    }
}

#[test]
fn remove_all_both_layouts() {
    for mut repo in [TestRepo::single_file(), TestRepo::per_object()] {
        repo.insert_many([TestItem::new("a", "1"), TestItem::new("b", "2")]);
        repo.save_changes().unwrap();

        repo.remove_all();
        repo.save_changes().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }
}

#[test]
fn empty_commit_is_a_noop() {
    let mut repo = TestRepo::single_file();
    repo.save_changes().unwrap();
    assert!(!repo.folder().join("test.json").exists());
}

#[test]
fn folder_path_naming_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("not-a-folder");
    fs::write(&file, b"x").unwrap();

    let result: Result<FileRepository<TestItem>, _> = FileRepository::new(
        "test",
        |i: &TestItem| i.id.clone(),
        FileOptions::new().folder_path(&file),
    );
    assert!(matches!(
        result,
        Err(RepoError::Storage(
            depot_core::StorageError::UnusableFolder { .. }
        ))
    ));
}

#[test]
fn find_and_exists_miss_cleanly() {
    for repo in [TestRepo::single_file(), TestRepo::per_object()] {
        assert!(repo.find(&Key::single("missing")).unwrap().is_none());
        assert!(!repo.exists(&Key::single("missing")).unwrap());
        assert!(matches!(
            repo.get(&Key::single("missing")),
            Err(RepoError::NotFound { .. })
        ));
    }
}
