//! The tree engine: composes flattening, expansion, selection, drag-and-drop,
//! virtualization, and rename behind one public surface.
//!
//! # Example
//!
//! ```ignore
//! use arbor::prelude::*;
//!
//! let tree = vec![TreeNode::<()>::branch("src", vec![TreeNode::leaf("main.rs")])];
//! let mut engine = TreeEngine::new(tree, TreeConfig::default());
//! engine.set_viewport_height(320.0);
//! engine.toggle_expanded("src", None);
//!
//! for row in engine.rows() {
//!     // position each row at row.offset_top
//! }
//! for event in engine.drain_events() {
//!     // dispatch to host callbacks
//! }
//! ```

use std::collections::HashSet;
use std::time::Instant;

use log::debug;

use crate::config::TreeConfig;
use crate::drag::{DragController, DragOutcome, DragSignal, Point, RowBounds, SessionId};
use crate::error::RenameError;
use crate::events::{EventQueue, TreeEvent};
use crate::expansion::{ExpansionController, ancestor_ids_of};
use crate::flatten::{DropPosition, FlatView, FlattenedNode, flatten};
use crate::input::{Key, KeyCombo, Modifiers};
use crate::item::{TreeItem, find_item, label_path};
use crate::rename::RenameController;
use crate::search::{NodeMatch, find_nodes};
use crate::selection::{SelectGesture, SelectionEngine};
use crate::viewport::{Viewport, VirtualWindow};

/// Inputs the flattened view was last built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ViewKey {
    tree: u64,
    expansion: u64,
    selection: u64,
    drag: u64,
}

/// A materialized row.
#[derive(Debug, Clone, Copy)]
pub struct VirtualRow<'a> {
    /// The flattened node.
    pub node: &'a FlattenedNode,
    /// Index in the visible rows.
    pub index: usize,
    /// Absolute offset from the top of the scroll track.
    pub offset_top: f32,
    /// The row has keyboard focus.
    pub is_focused: bool,
    /// The row is being renamed.
    pub is_renaming: bool,
}

/// A virtualized, hierarchical tree engine.
///
/// The caller owns the tree and the selection set. The engine owns expansion,
/// the drag session, the rename session, focus, and scroll position, and
/// recomputes its flattened view whenever any input changes.
#[derive(Debug)]
pub struct TreeEngine<T: TreeItem> {
    config: TreeConfig,
    roots: Vec<T>,
    tree_revision: u64,
    selected: HashSet<String>,
    selection_revision: u64,
    last_proposed: Option<HashSet<String>>,
    expansion: ExpansionController,
    selection: SelectionEngine,
    drag: DragController,
    rename: RenameController,
    viewport: Viewport,
    events: EventQueue,
    focused: Option<String>,
    hovered: Option<String>,
    view: FlatView,
    view_key: Option<ViewKey>,
    dirty: bool,
}

impl<T: TreeItem> TreeEngine<T> {
    /// Create an engine with nothing expanded.
    pub fn new(roots: Vec<T>, config: TreeConfig) -> Self {
        Self::with_expanded(roots, config, std::iter::empty::<String>())
    }

    /// Create an engine with initially expanded ids.
    pub fn with_expanded<I, S>(roots: Vec<T>, config: TreeConfig, expanded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut engine = Self {
            selection: SelectionEngine::new(config.multi_select),
            drag: DragController::new(
                config.allow_drag,
                config.allow_drop,
                config.hover_expand_delay(),
            ),
            viewport: Viewport::new(config.effective_row_height(), config.overscan),
            config,
            roots,
            tree_revision: 0,
            selected: HashSet::new(),
            selection_revision: 0,
            last_proposed: None,
            expansion: ExpansionController::with_expanded(expanded),
            rename: RenameController::new(),
            events: EventQueue::new(),
            focused: None,
            hovered: None,
            view: FlatView::default(),
            view_key: None,
            dirty: true,
        };
        engine.refresh();
        engine
    }

    // -------------------------------------------------------------------------
    // Inputs
    // -------------------------------------------------------------------------

    /// The engine configuration.
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Root items.
    pub fn roots(&self) -> &[T] {
        &self.roots
    }

    /// Replace the tree. Expansion and selection are kept by id.
    pub fn set_items(&mut self, roots: Vec<T>) {
        self.roots = roots;
        self.tree_revision += 1;
        self.refresh();

        if let Some(session) = self.rename.session()
            && !self.view.contains(&session.node_id)
        {
            self.rename.cancel();
        }
        if let Some(focused) = &self.focused
            && !self.view.contains(focused)
        {
            self.focused = None;
        }
    }

    /// The selection set last supplied by the caller.
    pub fn selected_ids(&self) -> &HashSet<String> {
        &self.selected
    }

    /// Supply the caller's current selection.
    ///
    /// Every membership change expands the ancestors of the selected nodes.
    /// A change that is not the echo of the engine's own proposal also
    /// scrolls the first selected node into view, retrying once if it is not
    /// visible yet.
    pub fn set_selected_ids<I, S>(&mut self, ids: I, now: Instant)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: HashSet<String> = ids.into_iter().map(Into::into).collect();
        let proposed = self.last_proposed.take();
        if ids == self.selected {
            return;
        }

        let echoed = proposed.as_ref() == Some(&ids);
        self.selected = ids;
        self.selection_revision += 1;

        if self.expansion.sync_ancestors_for(&self.selected, &self.roots) {
            self.emit_expanded();
        }
        self.refresh();
        if echoed {
            return;
        }

        let target = self
            .selected
            .iter()
            .filter_map(|id| self.view.order_index_of(id).map(|i| (i, id)))
            .min()
            .map(|(_, id)| id.clone())
            .or_else(|| self.selected.iter().min().cloned());
        if let Some(target) = target {
            self.request_scroll(&target, now);
        }
    }

    // -------------------------------------------------------------------------
    // Derived state
    // -------------------------------------------------------------------------

    /// The flattened view.
    pub fn view(&self) -> &FlatView {
        &self.view
    }

    /// Get a flattened node by id.
    pub fn node(&self, id: &str) -> Option<&FlattenedNode> {
        self.view.get(id)
    }

    /// Find the source item by id.
    pub fn item(&self, id: &str) -> Option<&T> {
        find_item(&self.roots, id)
    }

    /// The current virtualization window.
    pub fn window(&self) -> VirtualWindow {
        self.viewport.window(self.view.visible_len())
    }

    /// Rows to materialize, positioned absolutely.
    pub fn rows(&self) -> Vec<VirtualRow<'_>> {
        let window = self.window();
        window
            .range()
            .filter_map(|index| {
                let node = self.view.visible_node(index)?;
                Some(VirtualRow {
                    node,
                    index,
                    offset_top: window.offset_of(index),
                    is_focused: self.focused.as_deref() == Some(node.id.as_str()),
                    is_renaming: self.rename.is_renaming(&node.id),
                })
            })
            .collect()
    }

    /// Check if the engine has changed since the last `clear_dirty`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Take all queued events.
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        self.events.drain()
    }

    // -------------------------------------------------------------------------
    // Expand/Collapse
    // -------------------------------------------------------------------------

    /// The expanded ids.
    pub fn expanded_ids(&self) -> &HashSet<String> {
        self.expansion.expanded()
    }

    /// Check if a node is expanded.
    pub fn is_expanded(&self, id: &str) -> bool {
        self.expansion.is_expanded(id)
    }

    /// Flip a node's expansion, or force it open/closed.
    pub fn toggle_expanded(&mut self, id: &str, force: Option<bool>) {
        if self.expansion.toggle(id, force) {
            self.emit_expanded();
            self.refresh();
        }
    }

    /// Collapse every node.
    pub fn collapse_all(&mut self) {
        if self.expansion.collapse_all() {
            self.emit_expanded();
            self.refresh();
        }
    }

    /// Expand the given nodes in bulk.
    pub fn expand_nodes<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.expansion.expand_many(ids) {
            self.emit_expanded();
            self.refresh();
        }
    }

    /// Expand every node that has children.
    pub fn expand_all(&mut self) {
        if self.expansion.expand_all(&self.roots) {
            self.emit_expanded();
            self.refresh();
        }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// The row with keyboard focus.
    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Handle a click on a row.
    pub fn click_node(&mut self, id: &str, modifiers: Modifiers) {
        self.select_with(id, modifiers.gesture());
    }

    /// Propose selecting every node.
    pub fn select_all(&mut self) {
        if let Some(next) = self.selection.select_all(&self.view) {
            self.propose_selection(next);
        }
    }

    fn select_with(&mut self, id: &str, gesture: SelectGesture) {
        let Some(next) = self
            .selection
            .select_node(&self.view, id, gesture, &self.selected)
        else {
            return;
        };
        self.focused = Some(id.to_string());
        self.dirty = true;
        self.propose_selection(next);
    }

    fn propose_selection(&mut self, next: HashSet<String>) {
        if next == self.selected {
            return;
        }
        self.last_proposed = Some(next.clone());
        self.events.push(TreeEvent::SelectionChanged(next));
    }

    // -------------------------------------------------------------------------
    // Drag and drop
    // -------------------------------------------------------------------------

    /// Returns true if a drag is currently active.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// The drag controller, for inspecting the active session.
    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// Start dragging a row. Returns the session id, or None if refused.
    pub fn start_drag(&mut self, id: &str, origin: Point) -> Option<SessionId> {
        match self
            .drag
            .start_drag(&self.view, id, &self.selected, origin)
        {
            Ok(session) => {
                self.rename.cancel();
                self.refresh();
                Some(session)
            }
            Err(err) => {
                debug!("Drag start on '{}' refused: {}", id, err);
                None
            }
        }
    }

    /// Pointer moved over a row during a drag.
    pub fn drag_over(
        &mut self,
        id: &str,
        pointer_y: f32,
        bounds: RowBounds,
        now: Instant,
    ) -> Option<DropPosition> {
        let position = self
            .drag
            .handle_drag_over(&self.view, id, pointer_y, bounds, now);
        self.route_drag_signals();
        self.refresh();
        position
    }

    /// Pointer left every row during a drag.
    pub fn drag_leave(&mut self) {
        self.drag.handle_drag_leave();
        self.refresh();
    }

    /// Drop at the current target. Emits `NodeDropped` if the target is valid.
    pub fn drop_dragged(&mut self) -> Option<DragOutcome> {
        let outcome = self.drag.handle_drop(&self.view)?;
        if let DragOutcome::Dropped(event) = &outcome {
            self.events.push(TreeEvent::NodeDropped(event.clone()));
        }
        self.refresh();
        Some(outcome)
    }

    /// End the drag without dropping.
    pub fn drag_end(&mut self) -> Option<DragOutcome> {
        let outcome = self.drag.handle_drag_end();
        self.refresh();
        outcome
    }

    fn route_drag_signals(&mut self) {
        for signal in self.drag.take_signals() {
            match signal {
                DragSignal::HoverExpand(id) => {
                    if self.expansion.expand(&id) {
                        self.emit_expanded();
                    }
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Rename
    // -------------------------------------------------------------------------

    /// The rename controller, for inspecting the active session.
    pub fn rename(&self) -> &RenameController {
        &self.rename
    }

    /// Start renaming a row, seeded with its current label.
    pub fn start_rename(&mut self, id: &str) -> Result<SessionId, RenameError> {
        let label = self
            .item(id)
            .map(|item| item.label().to_string())
            .ok_or_else(|| RenameError::UnknownNode(id.to_string()))?;
        let session = self.rename.start(id, &label);
        self.dirty = true;
        Ok(session)
    }

    /// Replace the in-progress rename text.
    pub fn set_rename_text(&mut self, text: impl Into<String>) {
        if self.rename.set_text(text) {
            self.dirty = true;
        }
    }

    /// Commit a rename with `new_label`.
    ///
    /// A blank label is refused and the session stays open.
    pub fn commit_rename(&mut self, new_label: &str) -> Result<(), RenameError> {
        let commit = self.rename.commit(new_label)?;
        self.emit_renamed(commit.node_id, commit.label);
        Ok(())
    }

    /// Discard the rename. No-op when nothing is being renamed.
    pub fn cancel_rename(&mut self) {
        if self.rename.cancel() {
            self.dirty = true;
        }
    }

    fn emit_renamed(&mut self, node_id: String, label: String) {
        let label = if self.config.full_path_labels {
            match label_path(&self.roots, &node_id) {
                Some(mut path) => {
                    path.pop();
                    path.push(&label);
                    path.join(&self.config.path_separator)
                }
                None => label,
            }
        } else {
            label
        };
        self.events.push(TreeEvent::NodeRenamed { node_id, label });
        self.dirty = true;
    }

    // -------------------------------------------------------------------------
    // Pointer
    // -------------------------------------------------------------------------

    /// Context menu requested on a row.
    pub fn context_menu(&mut self, id: &str) {
        if self.view.contains(id) {
            self.events.push(TreeEvent::ContextMenu {
                node_id: id.to_string(),
            });
        }
    }

    /// Pointer hover moved. `None` means off all rows.
    pub fn hover(&mut self, id: Option<&str>) {
        if self.hovered.as_deref() != id {
            self.hovered = id.map(str::to_string);
            self.events.push(TreeEvent::Hover {
                node_id: self.hovered.clone(),
            });
        }
    }

    // -------------------------------------------------------------------------
    // Scrolling
    // -------------------------------------------------------------------------

    /// Current scroll offset.
    pub fn scroll_top(&self) -> f32 {
        self.viewport.scroll_top()
    }

    /// Set the viewport height (on resize).
    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport.set_height(height, self.view.visible_len());
        self.dirty = true;
    }

    /// Scroll to an absolute offset (on scroll).
    pub fn scroll_to(&mut self, offset: f32) {
        if self.viewport.scroll_to(offset, self.view.visible_len()) {
            self.dirty = true;
        }
    }

    /// Scroll by a relative amount.
    pub fn scroll_by(&mut self, delta: f32) {
        if self.viewport.scroll_by(delta, self.view.visible_len()) {
            self.dirty = true;
        }
    }

    /// Scroll a node into view, retrying once if it is not visible yet.
    pub fn scroll_to_node(&mut self, id: &str, now: Instant) {
        self.request_scroll(id, now);
    }

    /// The pending scroll-to-node request, if any.
    pub fn pending_scroll(&self) -> Option<&str> {
        self.viewport.pending().map(|p| p.node_id.as_str())
    }

    fn request_scroll(&mut self, id: &str, now: Instant) {
        let delay = self.config.scroll_retry_delay();
        if self.viewport.request_scroll_to(&self.view, id, now, delay) {
            self.dirty = true;
        }
    }

    /// Drive time-based work: hover auto-expand and the scroll retry.
    pub fn tick(&mut self, now: Instant) {
        self.drag.poll(now);
        self.route_drag_signals();
        self.refresh();
        if self.viewport.poll(&self.view, now) {
            self.dirty = true;
        }
    }

    // -------------------------------------------------------------------------
    // Find
    // -------------------------------------------------------------------------

    /// Fuzzy-find nodes by label across the whole tree.
    pub fn find(&self, query: &str) -> Vec<NodeMatch> {
        find_nodes(&self.roots, query)
    }

    /// Open a node's ancestors, propose it as the selection, and scroll to it.
    pub fn reveal(&mut self, id: &str, now: Instant) -> bool {
        if !self.view.contains(id) {
            return false;
        }
        let target = HashSet::from([id.to_string()]);
        if self
            .expansion
            .expand_many(ancestor_ids_of(&self.roots, &target))
        {
            self.emit_expanded();
            self.refresh();
        }
        self.selection.set_anchor(Some(id.to_string()));
        self.focused = Some(id.to_string());
        self.propose_selection(target);
        self.request_scroll(id, now);
        self.dirty = true;
        true
    }

    // -------------------------------------------------------------------------
    // Keyboard
    // -------------------------------------------------------------------------

    /// Handle a key press. Returns true if the key was consumed.
    pub fn handle_key(&mut self, combo: KeyCombo) -> bool {
        if self.rename.is_active() {
            return self.handle_rename_key(combo);
        }

        let mods = combo.modifiers;
        match combo.key {
            Key::Escape if self.drag.is_dragging() => {
                self.drag_end();
                true
            }
            Key::Up => self.move_focus(-1, mods.shift),
            Key::Down => self.move_focus(1, mods.shift),
            Key::Home => self.focus_visible(0, mods.shift),
            Key::End => match self.view.visible_len().checked_sub(1) {
                Some(last) => self.focus_visible(last, mods.shift),
                None => false,
            },
            Key::Left => self.focus_left(),
            Key::Right => self.focus_right(),
            Key::Space => match self.focused.clone() {
                Some(id) => {
                    self.select_with(&id, SelectGesture::TOGGLE);
                    true
                }
                None => false,
            },
            Key::Char('a') if mods.ctrl || mods.meta => {
                self.select_all();
                true
            }
            Key::F(2) => match self.focused.clone() {
                Some(id) => self.start_rename(&id).is_ok(),
                None => false,
            },
            _ => false,
        }
    }

    fn handle_rename_key(&mut self, combo: KeyCombo) -> bool {
        let mods = combo.modifiers;
        let changed = match combo.key {
            Key::Enter => match self.rename.commit_text() {
                Ok(commit) => {
                    self.emit_renamed(commit.node_id, commit.label);
                    true
                }
                Err(err) => {
                    debug!("Rename commit refused: {}", err);
                    false
                }
            },
            Key::Escape => self.rename.cancel(),
            Key::Backspace => self.rename.pop_char(),
            Key::Space => self.rename.push_char(' '),
            Key::Char(c) if !mods.ctrl && !mods.alt && !mods.meta => self.rename.push_char(c),
            _ => return false,
        };
        if changed {
            self.dirty = true;
        }
        true
    }

    fn focused_visible_index(&self) -> Option<usize> {
        let id = self.focused.as_deref()?;
        self.view.visible_index_of(id).or_else(|| {
            self.view
                .ancestors(id)
                .find_map(|a| self.view.visible_index_of(&a.id))
        })
    }

    fn move_focus(&mut self, delta: isize, extend: bool) -> bool {
        let len = self.view.visible_len();
        if len == 0 {
            return false;
        }
        let target = match self.focused_visible_index() {
            Some(current) => current.saturating_add_signed(delta).min(len - 1),
            None => 0,
        };
        self.focus_visible(target, extend)
    }

    fn focus_visible(&mut self, index: usize, extend: bool) -> bool {
        let Some(id) = self.view.visible_node(index).map(|n| n.id.clone()) else {
            return false;
        };
        let gesture = if extend {
            SelectGesture::RANGE
        } else {
            SelectGesture::PLAIN
        };
        self.select_with(&id, gesture);
        if self
            .viewport
            .scroll_into_view(index, self.view.visible_len())
        {
            self.dirty = true;
        }
        true
    }

    fn focus_left(&mut self) -> bool {
        let Some(node) = self.focused.as_deref().and_then(|id| self.view.get(id)) else {
            return false;
        };
        if node.has_children && node.state.is_expanded {
            let id = node.id.clone();
            self.toggle_expanded(&id, Some(false));
            return true;
        }
        let parent_index = node
            .parent_id
            .as_deref()
            .and_then(|p| self.view.visible_index_of(p));
        match parent_index {
            Some(index) => self.focus_visible(index, false),
            None => false,
        }
    }

    fn focus_right(&mut self) -> bool {
        let Some(node) = self.focused.as_deref().and_then(|id| self.view.get(id)) else {
            return false;
        };
        if !node.has_children {
            return false;
        }
        if !node.state.is_expanded {
            let id = node.id.clone();
            self.toggle_expanded(&id, Some(true));
            return true;
        }
        let first_child = self.view.visible_index_of(&node.id).map(|i| i + 1);
        match first_child {
            Some(index) => self.focus_visible(index, false),
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Recompute
    // -------------------------------------------------------------------------

    fn emit_expanded(&mut self) {
        self.events.push(TreeEvent::ExpandedChanged(
            self.expansion.expanded().clone(),
        ));
    }

    /// Rebuild the flattened view if any of its inputs changed.
    fn refresh(&mut self) {
        let key = ViewKey {
            tree: self.tree_revision,
            expansion: self.expansion.revision(),
            selection: self.selection_revision,
            drag: self.drag.revision(),
        };
        if self.view_key == Some(key) {
            return;
        }

        let mut view = flatten(&self.roots, self.expansion.expanded(), &self.selected);
        self.drag.annotate(&mut view);
        self.view = view;
        self.view_key = Some(key);
        self.viewport.clamp(self.view.visible_len());
        self.dirty = true;
    }
}
