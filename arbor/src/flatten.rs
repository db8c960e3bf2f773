//! Depth-first linearization of the tree into annotated rows.
//!
//! Every node ends up in the output, visible or not, so order indices stay
//! stable across expand/collapse. Rendering and virtualization work on the
//! visible subsequence only.

use std::collections::{HashMap, HashSet};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::item::TreeItem;

/// Where dragged nodes would land relative to a hovered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    /// Insert as the previous sibling.
    Before,
    /// Insert as a child.
    Inside,
    /// Insert as the next sibling.
    After,
}

/// Per-row state flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    /// Every strict ancestor is expanded.
    pub is_visible: bool,
    /// The node's id is in the expansion set.
    pub is_expanded: bool,
    /// The node's id is in the selection set.
    pub is_selected: bool,
    /// Some strict ancestor is selected.
    pub is_parent_selected: bool,
    /// The node is part of the active drag session.
    pub is_dragging: bool,
    /// The node is the current drop target.
    pub is_drop_target: bool,
    /// Drop position when this node is the drop target.
    pub drop_position: Option<DropPosition>,
}

/// A node in the flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FlattenedNode {
    /// The node's id.
    pub id: String,
    /// Depth in tree (0 = root).
    pub depth: usize,
    /// Parent id (None for root nodes).
    pub parent_id: Option<String>,
    /// Position in the full depth-first flattening.
    pub order_index: usize,
    /// Whether this node has children.
    pub has_children: bool,
    /// Whether this node accepts `inside` drops.
    pub can_contain: bool,
    /// Row state.
    pub state: NodeState,
}

/// The flattened tree plus lookup tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatView {
    nodes: Vec<FlattenedNode>,
    visible: Vec<usize>,
    by_id: HashMap<String, usize>,
}

impl FlatView {
    /// All nodes in depth-first order.
    pub fn nodes(&self) -> &[FlattenedNode] {
        &self.nodes
    }

    /// Number of nodes, visible or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by id.
    pub fn get(&self, id: &str) -> Option<&FlattenedNode> {
        self.by_id.get(id).map(|&index| &self.nodes[index])
    }

    /// Get a node by order index.
    pub fn at(&self, order_index: usize) -> Option<&FlattenedNode> {
        self.nodes.get(order_index)
    }

    /// Order index of a node.
    pub fn order_index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Check if a node exists.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Number of visible rows.
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Get a visible row by its index in the visible subsequence.
    pub fn visible_node(&self, visible_index: usize) -> Option<&FlattenedNode> {
        self.visible.get(visible_index).map(|&index| &self.nodes[index])
    }

    /// Iterate visible rows in order.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &FlattenedNode> {
        self.visible.iter().map(|&index| &self.nodes[index])
    }

    /// Ids of the visible rows in order.
    pub fn visible_ids(&self) -> Vec<&str> {
        self.visible_nodes().map(|n| n.id.as_str()).collect()
    }

    /// Index of a node in the visible subsequence.
    ///
    /// None if the node is unknown or hidden under a collapsed ancestor.
    pub fn visible_index_of(&self, id: &str) -> Option<usize> {
        let order_index = self.order_index_of(id)?;
        self.visible.binary_search(&order_index).ok()
    }

    /// Iterate a node's strict ancestors, nearest first.
    pub fn ancestors<'a>(
        &'a self,
        id: &str,
    ) -> impl Iterator<Item = &'a FlattenedNode> + use<'a> {
        let mut next = self.get(id).and_then(|n| n.parent_id.clone());
        std::iter::from_fn(move || {
            let node = self.get(next.as_deref()?)?;
            next = node.parent_id.clone();
            Some(node)
        })
    }

    /// Check whether `id` is one of `roots` or lies inside one of their subtrees.
    pub fn is_same_or_descendant(&self, id: &str, roots: &HashSet<String>) -> bool {
        roots.contains(id) || self.ancestors(id).any(|a| roots.contains(&a.id))
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut FlattenedNode> {
        let index = *self.by_id.get(id)?;
        self.nodes.get_mut(index)
    }
}

struct Pending<'a, T> {
    item: &'a T,
    depth: usize,
    parent_index: Option<usize>,
    visible: bool,
    ancestor_selected: bool,
}

/// Flatten the tree depth-first, annotating each row with its state.
///
/// Walks with an explicit stack so arbitrarily deep trees cannot overflow the
/// call stack. Identical inputs always produce identical output.
pub fn flatten<T: TreeItem>(
    roots: &[T],
    expanded: &HashSet<String>,
    selected: &HashSet<String>,
) -> FlatView {
    let mut view = FlatView::default();
    let mut stack: Vec<Pending<'_, T>> = roots
        .iter()
        .rev()
        .map(|item| Pending {
            item,
            depth: 0,
            parent_index: None,
            visible: true,
            ancestor_selected: false,
        })
        .collect();

    while let Some(entry) = stack.pop() {
        let item = entry.item;
        let id = item.id();
        let children = item.children();
        let order_index = view.nodes.len();
        let is_expanded = expanded.contains(id);
        let is_selected = selected.contains(id);

        if view.by_id.contains_key(id) {
            warn!("Duplicate tree node id '{}' at order index {}", id, order_index);
        } else {
            view.by_id.insert(id.to_string(), order_index);
        }
        if entry.visible {
            view.visible.push(order_index);
        }

        let parent_id = entry.parent_index.map(|p| view.nodes[p].id.clone());
        view.nodes.push(FlattenedNode {
            id: id.to_string(),
            depth: entry.depth,
            parent_id,
            order_index,
            has_children: !children.is_empty(),
            can_contain: item.can_contain(),
            state: NodeState {
                is_visible: entry.visible,
                is_expanded,
                is_selected,
                is_parent_selected: entry.ancestor_selected,
                ..NodeState::default()
            },
        });

        let child_visible = entry.visible && is_expanded;
        let child_ancestor_selected = entry.ancestor_selected || is_selected;
        stack.extend(children.iter().rev().map(|child| Pending {
            item: child,
            depth: entry.depth + 1,
            parent_index: Some(order_index),
            visible: child_visible,
            ancestor_selected: child_ancestor_selected,
        }));
    }

    view
}
