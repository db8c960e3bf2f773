//! Tests for keyboard navigation and crossterm key conversion.

use std::collections::HashSet;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use arbor::input::{Key, KeyCombo, Modifiers};
use arbor::{TreeConfig, TreeEngine, TreeEvent, TreeNode};

type Node = TreeNode;

fn set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// A{B, C{D, E}}, F
fn engine() -> TreeEngine<Node> {
    let tree = vec![
        Node::branch(
            "A",
            vec![
                Node::leaf("B"),
                Node::branch("C", vec![Node::leaf("D"), Node::leaf("E")]),
            ],
        ),
        Node::leaf("F"),
    ];
    let mut engine = TreeEngine::new(tree, TreeConfig::default());
    engine.set_viewport_height(320.0);
    engine
}

fn press(engine: &mut TreeEngine<Node>, key: Key) -> bool {
    engine.handle_key(KeyCombo::key(key))
}

fn last_selection(engine: &mut TreeEngine<Node>) -> Option<HashSet<String>> {
    engine
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            TreeEvent::SelectionChanged(ids) => Some(ids),
            _ => None,
        })
        .last()
}

#[test]
fn test_down_without_focus_starts_at_top() {
    let mut engine = engine();
    assert!(press(&mut engine, Key::Down));
    assert_eq!(engine.focused(), Some("A"));
    assert_eq!(last_selection(&mut engine), Some(set(&["A"])));
}

#[test]
fn test_up_down_walk_visible_rows() {
    let mut engine = engine();
    press(&mut engine, Key::Down);
    press(&mut engine, Key::Down);
    assert_eq!(engine.focused(), Some("F"));

    // Clamped at the last row
    press(&mut engine, Key::Down);
    assert_eq!(engine.focused(), Some("F"));

    press(&mut engine, Key::Up);
    press(&mut engine, Key::Up);
    assert_eq!(engine.focused(), Some("A"));
}

#[test]
fn test_right_expands_then_enters() {
    let mut engine = engine();
    press(&mut engine, Key::Down);

    assert!(press(&mut engine, Key::Right));
    assert!(engine.is_expanded("A"));
    assert_eq!(engine.focused(), Some("A"));

    assert!(press(&mut engine, Key::Right));
    assert_eq!(engine.focused(), Some("B"));

    // Leaf: nothing to do
    assert!(!press(&mut engine, Key::Right));
}

#[test]
fn test_left_collapses_then_goes_to_parent() {
    let mut engine = engine();
    press(&mut engine, Key::Down);
    press(&mut engine, Key::Right);
    press(&mut engine, Key::Down);
    press(&mut engine, Key::Down);
    assert_eq!(engine.focused(), Some("C"));
    press(&mut engine, Key::Right);
    press(&mut engine, Key::Down);
    assert_eq!(engine.focused(), Some("D"));

    assert!(press(&mut engine, Key::Left));
    assert_eq!(engine.focused(), Some("C"));

    assert!(press(&mut engine, Key::Left));
    assert!(!engine.is_expanded("C"));
    assert_eq!(engine.focused(), Some("C"));

    assert!(press(&mut engine, Key::Left));
    assert_eq!(engine.focused(), Some("A"));

    press(&mut engine, Key::Left);
    assert!(!press(&mut engine, Key::Left));
}

#[test]
fn test_home_end() {
    let mut engine = engine();
    engine.expand_all();
    assert!(press(&mut engine, Key::End));
    assert_eq!(engine.focused(), Some("F"));
    assert!(press(&mut engine, Key::Home));
    assert_eq!(engine.focused(), Some("A"));
}

#[test]
fn test_shift_down_extends_range() {
    let mut engine = engine();
    engine.expand_all();
    press(&mut engine, Key::Down);
    let shift_down = KeyCombo::key(Key::Down).shift();
    engine.handle_key(shift_down);
    engine.handle_key(shift_down);
    assert_eq!(engine.focused(), Some("C"));
    assert_eq!(last_selection(&mut engine), Some(set(&["A", "B", "C"])));
}

#[test]
fn test_space_toggles_focused() {
    let mut engine = engine();
    press(&mut engine, Key::Down);
    engine.drain_events();
    engine.set_selected_ids(["A", "F"], std::time::Instant::now());

    assert!(press(&mut engine, Key::Space));
    assert_eq!(last_selection(&mut engine), Some(set(&["F"])));
}

#[test]
fn test_ctrl_a_selects_all() {
    let mut engine = engine();
    assert!(engine.handle_key(KeyCombo::key(Key::Char('a')).ctrl()));
    assert_eq!(last_selection(&mut engine).map(|s| s.len()), Some(6));
    assert!(!press(&mut engine, Key::Char('a')));
}

#[test]
fn test_f2_rename_typing_and_enter() {
    let mut engine = engine();
    press(&mut engine, Key::Down);
    press(&mut engine, Key::Down);
    engine.drain_events();
    assert!(press(&mut engine, Key::F(2)));
    assert!(engine.rename().is_renaming("F"));

    // While renaming, keys edit the text
    press(&mut engine, Key::Backspace);
    for c in "ile".chars() {
        press(&mut engine, Key::Char(c));
    }
    press(&mut engine, Key::Space);
    press(&mut engine, Key::Char('1'));
    // Navigation keys are not consumed while renaming
    assert!(!press(&mut engine, Key::Up));
    assert_eq!(engine.focused(), Some("F"));
    assert_eq!(engine.rename().session().unwrap().text, "ile 1");

    assert!(press(&mut engine, Key::Enter));
    assert_eq!(
        engine.drain_events(),
        vec![TreeEvent::NodeRenamed {
            node_id: "F".into(),
            label: "ile 1".into(),
        }]
    );
}

#[test]
fn test_escape_cancels_rename() {
    let mut engine = engine();
    press(&mut engine, Key::Down);
    press(&mut engine, Key::F(2));
    assert!(press(&mut engine, Key::Escape));
    assert!(!engine.rename().is_active());
    assert!(!press(&mut engine, Key::Escape));
}

#[test]
fn test_enter_with_blank_text_keeps_rename() {
    let mut engine = engine();
    press(&mut engine, Key::Down);
    press(&mut engine, Key::F(2));
    press(&mut engine, Key::Backspace);
    assert!(press(&mut engine, Key::Enter));
    assert!(engine.rename().is_renaming("A"));
}

#[test]
fn test_keyboard_scrolls_focus_into_view() {
    let roots: Vec<Node> = (0..100).map(|i| Node::leaf(format!("n{i}"))).collect();
    let mut engine = TreeEngine::new(roots, TreeConfig::default().overscan(0));
    engine.set_viewport_height(320.0);

    assert!(press(&mut engine, Key::End));
    assert_eq!(engine.scroll_top(), 3200.0 - 320.0);
    assert!(press(&mut engine, Key::Home));
    assert_eq!(engine.scroll_top(), 0.0);
}

#[test]
fn test_focus_stays_on_screen_with_overscan() {
    let roots: Vec<Node> = (0..100).map(|i| Node::leaf(format!("n{i}"))).collect();
    let mut engine = TreeEngine::new(roots, TreeConfig::default());
    engine.set_viewport_height(320.0);

    for _ in 0..10 {
        press(&mut engine, Key::Down);
    }
    assert_eq!(engine.focused(), Some("n9"));
    assert_eq!(engine.scroll_top(), 0.0);

    for _ in 0..5 {
        press(&mut engine, Key::Down);
    }
    assert_eq!(engine.focused(), Some("n14"));
    assert_eq!(engine.scroll_top(), 15.0 * 32.0 - 320.0);

    // Up to the first row on screen, then one past it
    for _ in 0..10 {
        press(&mut engine, Key::Up);
    }
    assert_eq!(engine.focused(), Some("n4"));
    assert_eq!(engine.scroll_top(), 4.0 * 32.0);
}

#[test]
fn test_modifiers_from_crossterm() {
    let mods = Modifiers::from(KeyModifiers::CONTROL | KeyModifiers::SHIFT);
    assert!(mods.ctrl && mods.shift && !mods.alt && !mods.meta);
    assert!(Modifiers::from(KeyModifiers::SUPER).meta);

    let gesture = Modifiers::from(KeyModifiers::SUPER).gesture();
    assert!(gesture.toggle && !gesture.range);
    assert!(Modifiers::SHIFT.gesture().range);
}

#[test]
fn test_key_combo_from_crossterm() {
    let event = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::CONTROL);
    assert_eq!(
        KeyCombo::from_key_event(event),
        Some(KeyCombo::key(Key::Char('a')).ctrl())
    );

    let space = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
    assert_eq!(
        KeyCombo::from_key_event(space),
        Some(KeyCombo::key(Key::Space))
    );

    let f2 = KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE);
    assert_eq!(KeyCombo::from_key_event(f2), Some(KeyCombo::key(Key::F(2))));

    let release =
        KeyEvent::new_with_kind(KeyCode::Down, KeyModifiers::NONE, KeyEventKind::Release);
    assert_eq!(KeyCombo::from_key_event(release), None);

    let tab = KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE);
    assert_eq!(KeyCombo::from_key_event(tab), None);
}
