//! Expansion state: which nodes are open.

use std::collections::HashSet;

use log::debug;

use crate::item::TreeItem;

/// Owns the set of expanded node ids.
///
/// Every mutator reports whether the set actually changed, and each change
/// bumps `revision` so flattening can be memoized on it.
#[derive(Debug, Clone, Default)]
pub struct ExpansionController {
    expanded: HashSet<String>,
    observed_selection: HashSet<String>,
    revision: u64,
}

impl ExpansionController {
    /// Create a controller with nothing expanded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a controller seeded with initially expanded ids.
    pub fn with_expanded<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expanded: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// The expanded ids.
    pub fn expanded(&self) -> &HashSet<String> {
        &self.expanded
    }

    /// Change counter, bumped on every effective mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Check if a node is expanded.
    pub fn is_expanded(&self, node_id: &str) -> bool {
        self.expanded.contains(node_id)
    }

    /// Flip a node's expansion, or set it explicitly when `force` is given.
    pub fn toggle(&mut self, node_id: &str, force: Option<bool>) -> bool {
        let expand = force.unwrap_or_else(|| !self.expanded.contains(node_id));
        if expand {
            self.expand(node_id)
        } else {
            self.collapse(node_id)
        }
    }

    /// Expand a node.
    pub fn expand(&mut self, node_id: &str) -> bool {
        let changed = self.expanded.insert(node_id.to_string());
        self.bump(changed)
    }

    /// Collapse a node.
    pub fn collapse(&mut self, node_id: &str) -> bool {
        let changed = self.expanded.remove(node_id);
        self.bump(changed)
    }

    /// Collapse all nodes.
    pub fn collapse_all(&mut self) -> bool {
        let changed = !self.expanded.is_empty();
        self.expanded.clear();
        self.bump(changed)
    }

    /// Union the given ids into the expansion set.
    pub fn expand_many<I, S>(&mut self, node_ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut changed = false;
        for id in node_ids {
            changed |= self.expanded.insert(id.into());
        }
        self.bump(changed)
    }

    /// Expand every node that has children.
    pub fn expand_all<T: TreeItem>(&mut self, roots: &[T]) -> bool {
        let mut ids = Vec::new();
        let mut stack: Vec<&T> = roots.iter().collect();
        while let Some(item) = stack.pop() {
            let children = item.children();
            if !children.is_empty() {
                ids.push(item.id().to_string());
                stack.extend(children.iter());
            }
        }
        self.expand_many(ids)
    }

    /// Expand every ancestor of every selected node.
    ///
    /// Runs only when the selection's membership differs from the one seen on
    /// the previous call; changes to the expansion set itself never trigger
    /// it. Returns true if the expansion set changed.
    pub fn sync_ancestors_for<T: TreeItem>(
        &mut self,
        selected: &HashSet<String>,
        roots: &[T],
    ) -> bool {
        if *selected == self.observed_selection {
            return false;
        }
        self.observed_selection = selected.clone();
        if selected.is_empty() {
            return false;
        }

        let ancestors = ancestor_ids_of(roots, selected);
        debug!(
            "Ancestor sync: {} selected, {} ancestors",
            selected.len(),
            ancestors.len()
        );
        self.expand_many(ancestors)
    }

    fn bump(&mut self, changed: bool) -> bool {
        if changed {
            self.revision += 1;
        }
        changed
    }
}

/// Collect the strict ancestors of every target id.
///
/// Iterative depth-first walk that keeps the current root-to-node path.
pub fn ancestor_ids_of<T: TreeItem>(roots: &[T], targets: &HashSet<String>) -> HashSet<String> {
    let mut found = HashSet::new();
    let mut path: Vec<&str> = Vec::new();
    // (item, depth) pairs; `path` is truncated to `depth` before each visit
    let mut stack: Vec<(&T, usize)> = roots.iter().rev().map(|r| (r, 0)).collect();

    while let Some((item, depth)) = stack.pop() {
        path.truncate(depth);
        if targets.contains(item.id()) {
            found.extend(path.iter().map(|id| id.to_string()));
        }
        path.push(item.id());
        stack.extend(item.children().iter().rev().map(|c| (c, depth + 1)));
    }

    found
}
