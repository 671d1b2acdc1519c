//! Tests for backup inspection
//!

use std::path::Path;

use backup_janitor::{BackupCategory, inspect};
use chrono::{Local, TimeZone};
use common::{populated_editor, test_editor};

mod common;

#[test]
fn inspect_storage_backup() {
    let (editor, _locator) = test_editor();
    let backup = editor
        .create_backup_of(&editor.storage_file(), ".bak.1700000000", 3 * 1024 * 1024)
        .unwrap();

    let info = inspect(&backup);

    assert_eq!(info.path, backup);
    assert_eq!(info.size_bytes, Some(3 * 1024 * 1024));
    assert_eq!(info.size_display(), "3.00 MB");
    assert_eq!(info.category, Some(BackupCategory::StorageConfig));
    assert_eq!(
        info.created_at,
        Local.timestamp_opt(1_700_000_000, 0).single()
    );
    assert_eq!(
        info.created_display(),
        Local
            .timestamp_opt(1_700_000_000, 0)
            .unwrap()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    );
}

#[test]
fn inspect_missing_file() {
    let info = inspect(Path::new("/definitely/not/here/storage.json.bak.1700000000"));

    assert_eq!(info.size_bytes, None);
    assert_eq!(info.created_at, None);
    assert_eq!(info.category, None);
    assert_eq!(info.size_display(), "unknown");
    assert_eq!(info.created_display(), "unknown");
    assert_eq!(info.category_display(), "error");
}

#[test]
fn backup_without_timestamp() {
    let (editor, _locator) = test_editor();
    let backup = editor
        .create_backup_of(&editor.machine_id_file(), ".bak.manual", 10)
        .unwrap();

    let info = inspect(&backup);

    assert_eq!(info.size_bytes, Some(10));
    assert_eq!(info.created_at, None);
    assert_eq!(info.category, Some(BackupCategory::MachineId));
}

#[test]
fn every_discovered_backup_has_its_category() {
    let (_editor, locator) = populated_editor();

    for (category, paths) in locator.find_backups() {
        for path in paths {
            assert_eq!(inspect(&path).category, Some(category));
        }
    }
}

#[test]
fn inspection_is_repeatable() {
    let (editor, _locator) = test_editor();
    let backup = editor
        .create_backup_of(&editor.database_file(), ".bak.1700000000", 100)
        .unwrap();

    assert_eq!(inspect(&backup), inspect(&backup));
}
