//! Tests for deleting backups
//!

use std::fs;

use backup_janitor::{BackupCategory, NO_BACKUPS_FOUND, delete_files, purge_all_known_backups};
use common::{populated_editor, test_editor};

mod common;

#[test]
fn delete_skips_missing_files() {
    let (editor, _locator) = test_editor();
    let backup = editor
        .create_backup_of(&editor.storage_file(), ".bak.1700000000", 512)
        .unwrap();
    let missing = editor.root().join("missing.bak.1700000000");

    let outcome = delete_files(&[backup.clone(), missing]);

    assert_eq!(outcome.deleted_count, 1);
    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.bytes_freed, 512);
    assert!(!backup.exists());
}

#[test]
fn delete_continues_past_failures() {
    let (editor, _locator) = test_editor();
    editor.create_artifacts().unwrap();
    let first = editor
        .create_backup_of(&editor.database_file(), ".bak.1", 16)
        .unwrap();
    let last = editor
        .create_backup_of(&editor.database_file(), ".bak.2", 16)
        .unwrap();

    // A directory cannot be removed as a file.
    let directory = editor.workspace_storage_dir();

    let outcome = delete_files(&[first.clone(), directory.clone(), last.clone()]);

    assert_eq!(outcome.deleted_count, 2);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].path, directory);
    assert!(!outcome.failed[0].error.is_empty());
    assert!(!first.exists());
    assert!(!last.exists());
    assert!(directory.is_dir());
}

#[test]
fn delete_nothing() {
    let outcome = delete_files::<&str>(&[]);

    assert_eq!(outcome.deleted_count, 0);
    assert!(outcome.failed.is_empty());
    assert_eq!(outcome.bytes_freed, 0);
}

#[test]
fn delete_only_touches_given_paths() {
    let (_editor, locator) = populated_editor();
    let before = locator.find_backups();
    let target = before[&BackupCategory::MachineId][0].clone();

    let outcome = delete_files(&[&target]);

    assert_eq!(outcome.deleted_count, 1);
    let after = locator.find_backups();
    assert_eq!(after[&BackupCategory::MachineId].len(), 1);
    assert_eq!(after[&BackupCategory::StorageConfig], before[&BackupCategory::StorageConfig]);
}

#[test]
fn purge_with_nothing_found() {
    let (editor, locator) = test_editor();
    editor.create_artifacts().unwrap();

    let summary = purge_all_known_backups(&locator);

    assert!(summary.nothing_found());
    assert_eq!(summary.message, Some(NO_BACKUPS_FOUND));
    assert_eq!(summary.outcome.deleted_count, 0);
    assert!(summary.attempted.is_empty());

    // The artifacts themselves are never touched.
    assert!(editor.storage_file().is_file());
    assert!(editor.database_file().is_file());
    assert!(editor.machine_id_file().is_file());
    assert!(editor.workspace_storage_dir().is_dir());
}

#[test]
fn purge_everything() {
    let (editor, locator) = populated_editor();

    let summary = purge_all_known_backups(&locator);

    assert!(!summary.nothing_found());
    assert_eq!(summary.message, None);
    assert_eq!(summary.outcome.deleted_count, 8);
    assert!(summary.outcome.failed.is_empty());
    assert_eq!(summary.outcome.bytes_freed, 3 * (1024 + 2048) + 2 * 4096);

    for category in BackupCategory::MANAGED {
        assert_eq!(summary.attempted[&category], 2);
        assert_eq!(summary.removed[&category], 2);
    }

    let after = locator.find_backups();
    assert!(after.values().all(Vec::is_empty));
    assert!(editor.storage_file().is_file());
    assert!(editor.workspace_storage_dir().is_dir());
}

#[test]
fn purge_counts_only_confirmed_removals() {
    let (editor, locator) = populated_editor();

    // A directory that matches the backup pattern cannot be deleted as a file.
    let stuck = editor
        .database_file()
        .with_file_name("state.vscdb.bak.directory");
    fs::create_dir(&stuck).unwrap();

    let summary = purge_all_known_backups(&locator);

    assert_eq!(summary.attempted[&BackupCategory::Database], 3);
    assert_eq!(summary.removed[&BackupCategory::Database], 2);
    assert_eq!(summary.outcome.deleted_count, 8);
    assert_eq!(summary.outcome.failed.len(), 1);
    assert_eq!(summary.outcome.failed[0].path, stuck);
}

#[test]
fn second_purge_finds_nothing() {
    let (_editor, locator) = populated_editor();

    purge_all_known_backups(&locator);
    let summary = purge_all_known_backups(&locator);

    assert!(summary.nothing_found());
}
