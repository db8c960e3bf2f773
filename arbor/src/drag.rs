//! Drag-and-drop session tracking and drop target resolution.
//!
//! At most one session exists at a time. The controller never touches the
//! expansion set directly: sustained hover over a collapsed container is
//! published as a [`DragSignal`] that the owner drains and routes.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DragError;
use crate::flatten::{DropPosition, FlatView};

/// Unique identifier for a drag or rename session.
///
/// Serializes as the bare UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new unique session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A pointer position in host coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Vertical extent of a hovered row in the same coordinates as the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBounds {
    pub top: f32,
    pub height: f32,
}

impl RowBounds {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    /// Which third of the row `y` falls in.
    ///
    /// Top third is `Before`, bottom third is `After`, the rest is `Inside`.
    pub fn zone(&self, y: f32) -> DropPosition {
        let third = self.height / 3.0;
        let offset = y - self.top;
        if offset < third {
            DropPosition::Before
        } else if offset >= self.height - third {
            DropPosition::After
        } else {
            DropPosition::Inside
        }
    }
}

/// Current phase of the drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No drag is active.
    Idle,
    /// A drag is in progress.
    Dragging,
}

/// A completed drop, handed to the caller for reparenting/reordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropEvent {
    /// Dragged node ids in tree order.
    pub dragged: Vec<String>,
    /// The node dropped on.
    pub target: String,
    /// Where relative to `target`.
    pub position: DropPosition,
}

/// How a drag session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Dropped on a valid target.
    Dropped(DropEvent),
    /// Ended without a valid target, or cancelled.
    Cancelled,
}

/// Notifications published by the drag controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSignal {
    /// A collapsed container has been hovered long enough to open.
    HoverExpand(String),
}

#[derive(Debug, Clone)]
struct HoverTimer {
    node_id: String,
    since: Instant,
    fired: bool,
}

/// An active drag.
#[derive(Debug, Clone)]
pub struct DragSession {
    id: SessionId,
    drag_nodes: Vec<String>,
    drag_set: HashSet<String>,
    origin: Point,
    drop_target: Option<String>,
    drop_position: Option<DropPosition>,
    hover: Option<HoverTimer>,
}

impl DragSession {
    /// Session id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Dragged node ids in tree order.
    pub fn drag_nodes(&self) -> &[String] {
        &self.drag_nodes
    }

    /// Check if a node is being dragged.
    pub fn is_dragged(&self, node_id: &str) -> bool {
        self.drag_set.contains(node_id)
    }

    /// Pointer position where the drag started.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Currently hovered valid drop target.
    pub fn drop_target(&self) -> Option<&str> {
        self.drop_target.as_deref()
    }

    /// Drop position relative to the target.
    pub fn drop_position(&self) -> Option<DropPosition> {
        self.drop_position
    }
}

/// Owns the exclusive drag session.
#[derive(Debug)]
pub struct DragController {
    allow_drag: bool,
    allow_drop: bool,
    hover_expand_delay: Duration,
    session: Option<DragSession>,
    signals: Vec<DragSignal>,
    revision: u64,
}

impl DragController {
    /// Create a drag controller.
    pub fn new(allow_drag: bool, allow_drop: bool, hover_expand_delay: Duration) -> Self {
        Self {
            allow_drag,
            allow_drop,
            hover_expand_delay,
            session: None,
            signals: Vec::new(),
            revision: 0,
        }
    }

    /// Returns the current phase.
    pub fn phase(&self) -> DragPhase {
        if self.session.is_some() {
            DragPhase::Dragging
        } else {
            DragPhase::Idle
        }
    }

    /// Returns true if a drag is currently active.
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// The active session.
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Change counter, bumped whenever row annotations would change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Start dragging `node_id`.
    ///
    /// A selected node drags the whole selection (in tree order); an
    /// unselected node drags itself alone.
    pub fn start_drag(
        &mut self,
        view: &FlatView,
        node_id: &str,
        selected: &HashSet<String>,
        origin: Point,
    ) -> Result<SessionId, DragError> {
        if !self.allow_drag {
            return Err(DragError::Disabled);
        }
        if let Some(session) = &self.session {
            return Err(DragError::AlreadyActive(session.id.to_string()));
        }
        if !view.contains(node_id) {
            return Err(DragError::UnknownNode(node_id.to_string()));
        }

        let drag_nodes: Vec<String> = if selected.contains(node_id) {
            view.nodes()
                .iter()
                .filter(|n| selected.contains(&n.id))
                .map(|n| n.id.clone())
                .collect()
        } else {
            vec![node_id.to_string()]
        };

        let session = DragSession {
            id: SessionId::new(),
            drag_set: drag_nodes.iter().cloned().collect(),
            drag_nodes,
            origin,
            drop_target: None,
            drop_position: None,
            hover: None,
        };
        let id = session.id;
        debug!(
            "Drag {} started with {} node(s) from '{}'",
            id,
            session.drag_nodes.len(),
            node_id
        );
        self.session = Some(session);
        self.revision += 1;
        Ok(id)
    }

    /// Resolve the drop target for a pointer over `hovered_id`.
    ///
    /// Returns the drop position if the hovered row is a valid target. The
    /// dragged nodes, their descendants, and the middle zone of rows that
    /// cannot contain children are never valid.
    pub fn handle_drag_over(
        &mut self,
        view: &FlatView,
        hovered_id: &str,
        pointer_y: f32,
        bounds: RowBounds,
        now: Instant,
    ) -> Option<DropPosition> {
        let allow_drop = self.allow_drop;
        let session = self.session.as_mut()?;

        let resolved = view.get(hovered_id).and_then(|node| {
            if !allow_drop || view.is_same_or_descendant(hovered_id, &session.drag_set) {
                return None;
            }
            match bounds.zone(pointer_y) {
                DropPosition::Inside if !node.can_contain => None,
                position => Some((node, position)),
            }
        });

        let (target, position) = match resolved {
            Some((node, position)) => {
                let expandable = node.has_children && !node.state.is_expanded;
                let same_hover = session
                    .hover
                    .as_ref()
                    .is_some_and(|h| h.node_id == node.id);
                if !expandable {
                    session.hover = None;
                } else if !same_hover {
                    session.hover = Some(HoverTimer {
                        node_id: node.id.clone(),
                        since: now,
                        fired: false,
                    });
                }
                (Some(node.id.clone()), Some(position))
            }
            None => {
                session.hover = None;
                (None, None)
            }
        };

        trace!(
            "Drag over '{}' at y={} -> {:?} {:?}",
            hovered_id, pointer_y, target, position
        );

        if session.drop_target != target || session.drop_position != position {
            session.drop_target = target;
            session.drop_position = position;
            self.revision += 1;
        }

        self.poll(now);
        position
    }

    /// Clear the drop target when the pointer leaves all rows.
    pub fn handle_drag_leave(&mut self) {
        if let Some(session) = self.session.as_mut()
            && (session.drop_target.is_some() || session.hover.is_some())
        {
            session.drop_target = None;
            session.drop_position = None;
            session.hover = None;
            self.revision += 1;
        }
    }

    /// Publish a hover-expand signal once the hover delay has elapsed.
    pub fn poll(&mut self, now: Instant) {
        let delay = self.hover_expand_delay;
        let Some(hover) = self.session.as_mut().and_then(|s| s.hover.as_mut()) else {
            return;
        };
        if !hover.fired && now.saturating_duration_since(hover.since) >= delay {
            hover.fired = true;
            debug!("Hover auto-expand '{}'", hover.node_id);
            self.signals
                .push(DragSignal::HoverExpand(hover.node_id.clone()));
        }
    }

    /// Drain published signals.
    pub fn take_signals(&mut self) -> Vec<DragSignal> {
        std::mem::take(&mut self.signals)
    }

    /// Finish the drag by dropping.
    ///
    /// The target is re-validated against `view`; a stale or invalid target
    /// ends the session as `Cancelled`. Returns None when no drag is active.
    pub fn handle_drop(&mut self, view: &FlatView) -> Option<DragOutcome> {
        let session = self.end_session()?;
        let outcome = match (session.drop_target, session.drop_position) {
            (Some(target), Some(position))
                if view.contains(&target)
                    && !view.is_same_or_descendant(&target, &session.drag_set) =>
            {
                debug!("Drag {} dropped {:?} '{}'", session.id, position, target);
                DragOutcome::Dropped(DropEvent {
                    dragged: session.drag_nodes,
                    target,
                    position,
                })
            }
            _ => {
                debug!("Drag {} dropped without a valid target", session.id);
                DragOutcome::Cancelled
            }
        };
        Some(outcome)
    }

    /// End the drag without dropping. Returns None when no drag is active.
    pub fn handle_drag_end(&mut self) -> Option<DragOutcome> {
        let session = self.end_session()?;
        debug!("Drag {} cancelled", session.id);
        Some(DragOutcome::Cancelled)
    }

    /// Mark dragged rows and the drop target on a freshly flattened view.
    pub fn annotate(&self, view: &mut FlatView) {
        let Some(session) = &self.session else {
            return;
        };
        for id in &session.drag_nodes {
            if let Some(node) = view.get_mut(id) {
                node.state.is_dragging = true;
            }
        }
        if let Some(target) = &session.drop_target
            && let Some(node) = view.get_mut(target)
        {
            node.state.is_drop_target = true;
            node.state.drop_position = session.drop_position;
        }
    }

    fn end_session(&mut self) -> Option<DragSession> {
        let session = self.session.take()?;
        self.revision += 1;
        Some(session)
    }
}
