//! Headless engine for virtualized, hierarchical tree widgets.
//!
//! The engine maintains an arbitrarily deep node hierarchy and hands its
//! rendering host only the rows currently in view. On top of that it layers
//! multi-selection, keyboard navigation, drag-and-drop reparenting, inline
//! rename, find-in-tree, and auto-scroll to externally selected nodes.
//!
//! The host renders rows and forwards gestures; everything else lives here:
//!
//! - [`flatten`]: depth-first linearization into annotated rows
//! - [`expansion`]: expanded set and ancestor auto-expand
//! - [`selection`]: click/keyboard selection math
//! - [`drag`]: exclusive drag session and drop target geometry
//! - [`viewport`]: virtualization window and scroll-to-node
//! - [`rename`]: inline rename sessions
//! - [`engine`]: the orchestrator tying them together

pub mod config;
pub mod drag;
pub mod engine;
pub mod error;
pub mod events;
pub mod expansion;
pub mod flatten;
pub mod input;
pub mod item;
pub mod rename;
pub mod search;
pub mod selection;
pub mod viewport;

pub use config::TreeConfig;
pub use engine::{TreeEngine, VirtualRow};
pub use error::{DragError, RenameError};
pub use events::TreeEvent;
pub use flatten::{DropPosition, FlatView, FlattenedNode, NodeState, flatten};
pub use item::{TreeItem, TreeNode};

pub mod prelude {
    pub use crate::config::TreeConfig;
    pub use crate::drag::{DragOutcome, DropEvent, Point, RowBounds};
    pub use crate::engine::{TreeEngine, VirtualRow};
    pub use crate::error::{DragError, RenameError};
    pub use crate::events::TreeEvent;
    pub use crate::flatten::{DropPosition, FlatView, FlattenedNode};
    pub use crate::input::{Key, KeyCombo, Modifiers};
    pub use crate::item::{TreeItem, TreeNode};
    pub use crate::viewport::VirtualWindow;
}
