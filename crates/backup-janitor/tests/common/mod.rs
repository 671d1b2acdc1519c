//! # common
//!
#![allow(dead_code)]

use std::sync::Arc;

use backup_janitor::{ArtifactPaths, BackupLocator};
use shared::test::{FakeEditor, init_test_logger};

/// A fake editor directory and a locator pointed at it.
pub fn test_editor() -> (FakeEditor, BackupLocator<Arc<ArtifactPaths>>) {
    init_test_logger();

    let editor = FakeEditor::new().unwrap();
    let artifacts = ArtifactPaths::in_code_dir(&editor.code_dir());
    let locator = BackupLocator::new(Arc::new(artifacts));

    (editor, locator)
}

/// A fake editor with all artifacts and two backups of each.
pub fn populated_editor() -> (FakeEditor, BackupLocator<Arc<ArtifactPaths>>) {
    let (editor, locator) = test_editor();
    editor.create_artifacts().unwrap();

    for artifact in [
        editor.storage_file(),
        editor.database_file(),
        editor.machine_id_file(),
    ] {
        editor
            .create_backup_of(&artifact, ".bak.1700000000", 1024)
            .unwrap();
        editor
            .create_backup_of(&artifact, ".bak.1700000100", 2048)
            .unwrap();
    }

    let workspace = editor.workspace_storage_dir();
    editor
        .create_backup_of(&workspace, "_backup_1700000000.zip", 4096)
        .unwrap();
    editor
        .create_backup_of(&workspace, "_backup_1700000100.zip", 4096)
        .unwrap();

    (editor, locator)
}
