use std::fs;
use tempfile::tempdir;
use textdesk::error::{FileError, SessionError, TextdeskError};
use textdesk::{Document, DocumentState, FsTextStore, SessionRegistry, TextStore};

#[test]
fn test_open_save_cycle_on_disk() {
    let temp_dir = tempdir().unwrap();
    let file_path = temp_dir.path().join("notes.txt");
    fs::write(&file_path, "first").unwrap();

    let store = FsTextStore::new();
    let mut registry = SessionRegistry::new();
    let text = store.load(Some(&file_path)).expect("load");
    let id = registry.open_or_activate(&file_path, text).expect("open").id();

    let doc = registry.mutate(id, "second").expect("mutate");
    assert_eq!(doc.state(), DocumentState::BoundDirty);
    assert_eq!(doc.title(), "notes.txt● - Textdesk");

    let doc = registry.save(id, &store, None).expect("save");
    assert_eq!(doc.state(), DocumentState::BoundClean);
    assert_eq!(fs::read_to_string(&file_path).unwrap(), "second");
}

#[test]
fn test_two_spellings_share_one_document() {
    let temp_dir = tempdir().unwrap();
    let file_path = temp_dir.path().join("same.txt");
    fs::write(&file_path, "x").unwrap();
    let alias = temp_dir.path().join("sub").join("..").join("same.txt");

    let mut registry = SessionRegistry::new();
    let first = registry
        .open_or_activate(&file_path, "x".to_string())
        .unwrap()
        .id();
    let second = registry
        .open_or_activate(&alias, "x".to_string())
        .unwrap()
        .id();

    assert_eq!(first, second);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_untitled_save_binds_path() {
    let temp_dir = tempdir().unwrap();
    let target = temp_dir.path().join("draft.txt");

    let store = FsTextStore::new();
    let mut registry = SessionRegistry::with_untitled();
    let id = registry.active_id().unwrap();
    registry.mutate(id, "draft body").unwrap();

    let err = registry.save(id, &store, None).unwrap_err();
    assert_eq!(err, TextdeskError::Session(SessionError::PathRequired));

    let doc = registry.save(id, &store, Some(&target)).unwrap();
    assert_eq!(doc.state(), DocumentState::BoundClean);
    assert_eq!(doc.display_name(), "draft.txt");
    assert_eq!(fs::read_to_string(&target).unwrap(), "draft body");
}

#[test]
fn test_failed_save_keeps_dirty_state() {
    let temp_dir = tempdir().unwrap();
    let target = temp_dir.path().join("missing-dir").join("out.txt");

    let store = FsTextStore::new();
    let mut registry = SessionRegistry::with_untitled();
    let id = registry.active_id().unwrap();
    registry.mutate(id, "body").unwrap();

    let err = registry.save(id, &store, Some(&target)).unwrap_err();
    assert!(matches!(err, TextdeskError::File(FileError::Write { .. })));

    let doc = registry.get(id).unwrap();
    assert_eq!(doc.state(), DocumentState::Unbound);
    assert!(doc.is_dirty());
    assert!(!target.exists());
}

#[test]
fn test_document_create_missing_file_is_read_error() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope.txt");

    let store = FsTextStore::new();
    let id = SessionRegistry::with_untitled().active_id().unwrap();
    let err = Document::create(id, &store, "", Some(&missing)).unwrap_err();
    match err {
        TextdeskError::File(file_err) => assert!(file_err.is_read_error()),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_untitled_temp_name_displays_as_untitled() {
    let temp_dir = tempdir().unwrap();
    let file_path = temp_dir.path().join("Untitled-3f9a.txt");
    fs::write(&file_path, "").unwrap();

    let mut registry = SessionRegistry::new();
    let doc = registry
        .open_or_activate(&file_path, String::new())
        .unwrap();
    assert_eq!(doc.display_name(), "Untitled");
    assert_eq!(doc.title(), "Untitled - Textdesk");
}

#[cfg(unix)]
#[test]
fn test_save_through_symlink_matches_real_path() {
    let temp_dir = tempdir().unwrap();
    let real_dir = temp_dir.path().join("real");
    fs::create_dir(&real_dir).unwrap();
    let link_dir = temp_dir.path().join("link");
    std::os::unix::fs::symlink(&real_dir, &link_dir).unwrap();

    let store = FsTextStore::new();
    let mut registry = SessionRegistry::with_untitled();
    let id = registry.active_id().unwrap();
    registry.mutate(id, "body").unwrap();
    registry
        .save(id, &store, Some(&link_dir.join("new.txt")))
        .expect("save through link");

    let reopened = registry
        .open_or_activate(&real_dir.join("new.txt"), "body".to_string())
        .unwrap()
        .id();

    assert_eq!(reopened, id);
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.open_paths().len(), 1);
}
