//! Tests for the virtualization window and scroll-to-node.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use arbor::viewport::{Viewport, VirtualWindow};
use arbor::{FlatView, TreeNode, flatten};

type Node = TreeNode;

const RETRY: Duration = Duration::from_millis(150);

fn set(ids: &[&str]) -> HashSet<String> {
    ids.iter().map(|s| s.to_string()).collect()
}

/// Fifty leaves followed by `deep{target}`.
fn long_tree() -> Vec<Node> {
    let mut roots: Vec<Node> = (0..50).map(|i| Node::leaf(format!("r{i}"))).collect();
    roots.push(Node::branch("deep", vec![Node::leaf("target")]));
    roots
}

fn long_view(expanded: &[&str]) -> FlatView {
    flatten(&long_tree(), &set(expanded), &set(&[]))
}

fn viewport() -> Viewport {
    let mut viewport = Viewport::new(32.0, 10);
    viewport.set_height(320.0, 0);
    viewport
}

#[test]
fn test_window_mid_list() {
    let window = VirtualWindow::compute(100, 1600.0, 320.0, 32.0, 10);
    assert_eq!(window.range(), 40..70);
    assert_eq!(window.len(), 30);
    assert_eq!(window.total_height, 3200.0);
    assert_eq!(window.offset_of(45), 1440.0);
}

#[test]
fn test_window_clamps_at_top() {
    let window = VirtualWindow::compute(100, 0.0, 320.0, 32.0, 10);
    assert_eq!(window.range(), 0..20);
}

#[test]
fn test_window_clamps_at_end() {
    let window = VirtualWindow::compute(100, 2880.0, 320.0, 32.0, 10);
    assert_eq!(window.range(), 80..100);
}

#[test]
fn test_window_partial_row_rounds_up() {
    let window = VirtualWindow::compute(100, 16.0, 300.0, 32.0, 0);
    // first = 0, ceil(300 / 32) = 10 rows
    assert_eq!(window.range(), 0..10);
}

#[test]
fn test_window_short_list() {
    let window = VirtualWindow::compute(30, 0.0, 320.0, 32.0, 10);
    assert_eq!(window.range(), 0..20);

    let window = VirtualWindow::compute(5, 0.0, 320.0, 32.0, 10);
    assert_eq!(window.range(), 0..5);
}

#[test]
fn test_window_empty() {
    let window = VirtualWindow::compute(0, 100.0, 320.0, 32.0, 10);
    assert!(window.is_empty());
    assert_eq!(window.total_height, 0.0);
}

#[test]
fn test_scroll_is_clamped() {
    let mut viewport = viewport();
    assert!(!viewport.scroll_to(-50.0, 100));
    assert_eq!(viewport.scroll_top(), 0.0);

    assert!(viewport.scroll_to(10_000.0, 100));
    assert_eq!(viewport.scroll_top(), 2880.0);

    assert!(viewport.scroll_by(-80.0, 100));
    assert_eq!(viewport.scroll_top(), 2800.0);
}

#[test]
fn test_shrinking_list_reclamps() {
    let mut viewport = viewport();
    viewport.scroll_to(2000.0, 100);
    assert!(viewport.clamp(20));
    assert_eq!(viewport.scroll_top(), 320.0);

    assert!(viewport.clamp(5));
    assert_eq!(viewport.scroll_top(), 0.0);
}

#[test]
fn test_scroll_to_index_inside_window_is_noop() {
    let mut viewport = viewport();
    viewport.scroll_to(1600.0, 100);
    // Window is 40..70, overscan rows included
    assert!(!viewport.scroll_to_index(42, 100));
    assert!(!viewport.scroll_to_index(69, 100));
    assert_eq!(viewport.scroll_top(), 1600.0);
}

#[test]
fn test_scroll_to_index_aligns_edges() {
    let mut viewport = viewport();
    viewport.scroll_to(1600.0, 100);

    assert!(viewport.scroll_to_index(10, 100));
    assert_eq!(viewport.scroll_top(), 320.0);

    assert!(viewport.scroll_to_index(80, 100));
    assert_eq!(viewport.scroll_top(), 80.0 * 32.0 + 32.0 - 320.0);
}

#[test]
fn test_scroll_into_view_ignores_overscan() {
    let mut viewport = viewport();
    viewport.scroll_to(1600.0, 100);
    // Rows 50..60 on screen
    assert!(!viewport.scroll_into_view(55, 100));
    assert!(!viewport.scroll_into_view(59, 100));

    // Row 45 is materialized but above the screen
    assert!(viewport.scroll_into_view(45, 100));
    assert_eq!(viewport.scroll_top(), 45.0 * 32.0);

    assert!(viewport.scroll_into_view(62, 100));
    assert_eq!(viewport.scroll_top(), 63.0 * 32.0 - 320.0);

    assert!(!viewport.scroll_into_view(100, 100));

    // No height yet: nothing is on screen to align against
    let mut unsized_viewport = Viewport::new(32.0, 10);
    assert!(!unsized_viewport.scroll_into_view(5, 100));
    assert_eq!(unsized_viewport.scroll_top(), 0.0);
}

#[test]
fn test_request_scroll_to_visible_node() {
    let view = long_view(&[]);
    let mut viewport = viewport();
    assert!(viewport.request_scroll_to(&view, "deep", Instant::now(), RETRY));
    assert!(viewport.window(view.visible_len()).contains(50));
    assert!(viewport.pending().is_none());
}

#[test]
fn test_deferred_scroll_retries_once() {
    let mut viewport = viewport();
    let t0 = Instant::now();

    let hidden = long_view(&[]);
    assert!(!viewport.request_scroll_to(&hidden, "target", t0, RETRY));
    assert_eq!(viewport.pending().unwrap().node_id, "target");

    // Host expands "deep" before the retry
    let shown = long_view(&["deep"]);
    assert!(!viewport.poll(&shown, t0 + Duration::from_millis(100)));
    assert!(viewport.pending().is_some());

    assert!(viewport.poll(&shown, t0 + RETRY));
    assert_eq!(viewport.scroll_top(), 51.0 * 32.0 + 32.0 - 320.0);
    assert!(viewport.pending().is_none());
}

#[test]
fn test_deferred_scroll_expires_silently() {
    let mut viewport = viewport();
    let t0 = Instant::now();
    let hidden = long_view(&[]);

    viewport.request_scroll_to(&hidden, "target", t0, RETRY);
    assert!(!viewport.poll(&hidden, t0 + RETRY));
    assert!(viewport.pending().is_none());
    assert_eq!(viewport.scroll_top(), 0.0);

    // Expanding afterwards does not resurrect the request
    let shown = long_view(&["deep"]);
    assert!(!viewport.poll(&shown, t0 + Duration::from_secs(5)));
    assert_eq!(viewport.scroll_top(), 0.0);
}

#[test]
fn test_newer_request_supersedes_pending() {
    let mut viewport = viewport();
    let t0 = Instant::now();
    let hidden = long_view(&[]);

    viewport.request_scroll_to(&hidden, "target", t0, RETRY);
    let first = viewport.pending().unwrap().generation;
    viewport.request_scroll_to(&hidden, "ghost", t0, RETRY);
    let pending = viewport.pending().unwrap();
    assert_eq!(pending.node_id, "ghost");
    assert!(pending.generation > first);

    viewport.request_scroll_to(&hidden, "r3", t0, RETRY);
    assert!(viewport.pending().is_none());
}

#[test]
fn test_cancel_pending() {
    let mut viewport = viewport();
    let t0 = Instant::now();
    viewport.request_scroll_to(&long_view(&[]), "target", t0, RETRY);
    viewport.cancel_pending();
    assert!(!viewport.poll(&long_view(&["deep"]), t0 + RETRY));
    assert_eq!(viewport.scroll_top(), 0.0);
}
