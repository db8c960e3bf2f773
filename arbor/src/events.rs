//! Outbound tree events.
//!
//! The engine pushes events as gestures are handled; the host drains the
//! queue after each interaction and dispatches to its own callbacks.

use std::collections::HashSet;

use crate::drag::DropEvent;

/// Something the host should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    /// Proposed new selection. The engine does not apply it; feed it back
    /// through `set_selected_ids` to accept it.
    SelectionChanged(HashSet<String>),
    /// The expansion set changed.
    ExpandedChanged(HashSet<String>),
    /// A rename was committed. `label` is path-qualified in full-path mode.
    NodeRenamed { node_id: String, label: String },
    /// Nodes were dropped on a target.
    NodeDropped(DropEvent),
    /// Context menu requested for a node.
    ContextMenu { node_id: String },
    /// Pointer hover moved to another row, or off all rows.
    Hover { node_id: Option<String> },
}

impl TreeEvent {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            TreeEvent::SelectionChanged(_) => "selection_changed",
            TreeEvent::ExpandedChanged(_) => "expanded_changed",
            TreeEvent::NodeRenamed { .. } => "node_renamed",
            TreeEvent::NodeDropped(_) => "node_dropped",
            TreeEvent::ContextMenu { .. } => "context_menu",
            TreeEvent::Hover { .. } => "hover",
        }
    }
}

/// FIFO of pending events.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<TreeEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event.
    pub fn push(&mut self, event: TreeEvent) {
        log::trace!("Tree event queued: {}", event.kind());
        self.events.push(event);
    }

    /// Take all queued events in order.
    pub fn drain(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Queued events without draining.
    pub fn pending(&self) -> &[TreeEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
