//! Tests for rename sessions.

use arbor::RenameError;
use arbor::rename::RenameController;

#[test]
fn test_commit_trims_and_closes() {
    let mut rename = RenameController::new();
    rename.start("n1", "old");
    let commit = rename.commit("  new name \t").unwrap();
    assert_eq!(commit.node_id, "n1");
    assert_eq!(commit.label, "new name");
    assert!(!rename.is_active());
}

#[test]
fn test_empty_label_keeps_session_open() {
    let mut rename = RenameController::new();
    let id = rename.start("n1", "old");
    assert_eq!(rename.commit("   "), Err(RenameError::EmptyLabel));
    assert_eq!(rename.commit(""), Err(RenameError::EmptyLabel));

    let session = rename.session().unwrap();
    assert_eq!(session.id, id);
    assert_eq!(session.node_id, "n1");
}

#[test]
fn test_commit_without_session() {
    let mut rename = RenameController::new();
    assert_eq!(rename.commit("x"), Err(RenameError::NoActiveSession));
    assert_eq!(rename.commit_text(), Err(RenameError::NoActiveSession));
}

#[test]
fn test_cancel_is_noop_when_idle() {
    let mut rename = RenameController::new();
    assert!(!rename.cancel());

    rename.start("n1", "old");
    assert!(rename.cancel());
    assert!(!rename.is_active());
    assert!(!rename.cancel());
}

#[test]
fn test_start_supersedes_previous_session() {
    let mut rename = RenameController::new();
    let first = rename.start("n1", "one");
    let second = rename.start("n2", "two");
    assert_ne!(first, second);
    assert!(!rename.is_renaming("n1"));
    assert!(rename.is_renaming("n2"));

    let commit = rename.commit_text().unwrap();
    assert_eq!(commit.node_id, "n2");
    assert_eq!(commit.label, "two");
}

#[test]
fn test_text_editing() {
    let mut rename = RenameController::new();
    assert!(!rename.push_char('x'));

    rename.start("n1", "ab");
    assert!(rename.push_char('c'));
    assert!(rename.pop_char());
    assert!(rename.pop_char());
    assert_eq!(rename.session().unwrap().text, "a");

    rename.set_text("");
    assert!(!rename.pop_char());
    assert_eq!(rename.commit_text(), Err(RenameError::EmptyLabel));
    assert!(rename.is_active());
}
