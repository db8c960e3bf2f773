//! Outline Example
//!
//! Drives a tree engine headlessly through a short script of gestures and
//! prints the materialized rows after each step. Engine logs go to
//! `outline.log`.

use std::fs::File;
use std::time::{Duration, Instant};

use arbor::prelude::*;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum Kind {
    #[default]
    File,
    Dir,
}

fn file(id: &str, label: &str) -> TreeNode<Kind> {
    TreeNode::leaf(id).with_label(label)
}

fn dir(id: &str, label: &str, children: Vec<TreeNode<Kind>>) -> TreeNode<Kind> {
    TreeNode::branch(id, children)
        .with_label(label)
        .with_payload(Kind::Dir)
}

fn project() -> Vec<TreeNode<Kind>> {
    vec![
        dir(
            "src",
            "src",
            vec![
                file("src/lib.rs", "lib.rs"),
                dir(
                    "src/widgets",
                    "widgets",
                    vec![
                        file("src/widgets/tree.rs", "tree.rs"),
                        file("src/widgets/list.rs", "list.rs"),
                        file("src/widgets/scroll.rs", "scroll.rs"),
                    ],
                ),
                file("src/main.rs", "main.rs"),
            ],
        ),
        dir(
            "tests",
            "tests",
            vec![file("tests/tree.rs", "tree.rs")],
        ),
        file("Cargo.toml", "Cargo.toml"),
    ]
}

fn print_rows(title: &str, engine: &TreeEngine<TreeNode<Kind>>) {
    println!("-- {} --", title);
    for row in engine.rows() {
        let node = row.node;
        let item = engine.item(&node.id);
        let marker = match item.map(|i| i.payload) {
            Some(Kind::Dir) if node.state.is_expanded => "v ",
            Some(Kind::Dir) => "> ",
            _ => "  ",
        };
        let label = item.map(|i| i.label.as_str()).unwrap_or(&node.id);
        let focus = if row.is_focused { "*" } else { " " };
        let selected = if node.state.is_selected { "[x]" } else { "[ ]" };
        println!(
            "{:>6.1} {}{} {}{}{}",
            row.offset_top,
            focus,
            selected,
            "  ".repeat(node.depth),
            marker,
            label
        );
    }
}

/// Apply proposed selections the way a host would, and print the rest.
fn pump(engine: &mut TreeEngine<TreeNode<Kind>>, now: Instant) {
    for event in engine.drain_events() {
        match event {
            TreeEvent::SelectionChanged(ids) => engine.set_selected_ids(ids, now),
            other => println!("event: {:?}", other),
        }
    }
}

fn main() {
    // Initialize file logging
    if let Ok(log_file) = File::create("outline.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file);
    }

    let config = TreeConfig::new()
        .row_height(20.0)
        .overscan(2)
        .full_path_labels("/");
    let mut engine = TreeEngine::new(project(), config);
    engine.set_viewport_height(120.0);
    let start = Instant::now();

    print_rows("initial", &engine);

    // External selection opens every ancestor
    engine.set_selected_ids(["src/widgets/list.rs"], start);
    pump(&mut engine, start);
    print_rows("selected list.rs", &engine);

    // Keyboard: move down, extend with shift
    engine.handle_key(KeyCombo::key(Key::Down));
    engine.handle_key(KeyCombo::key(Key::Down).shift());
    pump(&mut engine, start);
    print_rows("shift+down", &engine);

    // Drag Cargo.toml over the collapsed tests folder until it opens
    let bounds = RowBounds::new(0.0, 20.0);
    engine.start_drag("Cargo.toml", Point::new(0.0, 0.0));
    engine.drag_over("tests", 10.0, bounds, start);
    engine.tick(start + Duration::from_millis(600));
    if let Some(outcome) = engine.drop_dragged() {
        println!("drop: {:?}", outcome);
    }
    pump(&mut engine, start);
    print_rows("after drag", &engine);

    // Rename through the keyboard
    engine.reveal("src/main.rs", start);
    pump(&mut engine, start);
    engine.handle_key(KeyCombo::key(Key::F(2)));
    for _ in 0.."main.rs".len() {
        engine.handle_key(KeyCombo::key(Key::Backspace));
    }
    for c in "app.rs".chars() {
        engine.handle_key(KeyCombo::key(Key::Char(c)));
    }
    engine.handle_key(KeyCombo::key(Key::Enter));
    pump(&mut engine, start);

    let found: Vec<_> = engine.find("tree").into_iter().map(|m| m.id).collect();
    println!("find 'tree': {:?}", found);
}
