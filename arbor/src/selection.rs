//! Selection math for click and keyboard gestures.
//!
//! The selection set itself belongs to the caller. This engine only computes
//! proposed sets; the caller decides whether to apply them.

use std::collections::HashSet;

use crate::flatten::FlatView;

/// How a selection gesture should combine with the current selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectGesture {
    /// Ctrl/Cmd held: add or remove a single node.
    pub toggle: bool,
    /// Shift held: select the range from the anchor.
    pub range: bool,
}

impl SelectGesture {
    /// Plain click.
    pub const PLAIN: Self = Self {
        toggle: false,
        range: false,
    };
    /// Ctrl/Cmd click.
    pub const TOGGLE: Self = Self {
        toggle: true,
        range: false,
    };
    /// Shift click.
    pub const RANGE: Self = Self {
        toggle: false,
        range: true,
    };
}

/// Computes new selection sets from gestures.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    multi_select: bool,
    /// Last interacted node, resolved to its order index at use time.
    anchor: Option<String>,
}

impl SelectionEngine {
    /// Create a selection engine.
    pub fn new(multi_select: bool) -> Self {
        Self {
            multi_select,
            anchor: None,
        }
    }

    /// Whether toggle and range gestures are honored.
    pub fn multi_select(&self) -> bool {
        self.multi_select
    }

    /// The current range anchor.
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Set the range anchor explicitly.
    pub fn set_anchor(&mut self, node_id: Option<String>) {
        self.anchor = node_id;
    }

    /// Compute the selection that results from a gesture on `node_id`.
    ///
    /// Returns None when the node is not in the view.
    pub fn select_node(
        &mut self,
        view: &FlatView,
        node_id: &str,
        gesture: SelectGesture,
        current: &HashSet<String>,
    ) -> Option<HashSet<String>> {
        let target = view.order_index_of(node_id)?;
        let gesture = if self.multi_select {
            gesture
        } else {
            SelectGesture::PLAIN
        };

        if gesture.range {
            let anchor = self
                .anchor
                .as_deref()
                .and_then(|id| view.order_index_of(id));
            if let Some(anchor) = anchor {
                let (lo, hi) = if anchor <= target {
                    (anchor, target)
                } else {
                    (target, anchor)
                };
                let mut next: HashSet<String> = if gesture.toggle {
                    current.clone()
                } else {
                    HashSet::new()
                };
                next.extend(view.nodes()[lo..=hi].iter().map(|n| n.id.clone()));
                return Some(next);
            }
        }

        self.anchor = Some(node_id.to_string());

        if gesture.toggle {
            let mut next = current.clone();
            if !next.remove(node_id) {
                next.insert(node_id.to_string());
            }
            return Some(next);
        }

        Some(HashSet::from([node_id.to_string()]))
    }

    /// Select every node in the view.
    ///
    /// None when multi-selection is disabled or the view is empty.
    pub fn select_all(&self, view: &FlatView) -> Option<HashSet<String>> {
        if !self.multi_select || view.is_empty() {
            return None;
        }
        Some(view.nodes().iter().map(|n| n.id.clone()).collect())
    }
}
