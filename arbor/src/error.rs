//! Error types for refused tree operations.
//!
//! None of these are fatal. The engine logs them and carries on; they exist so
//! callers driving the controllers directly can tell why a gesture was refused.

use thiserror::Error;

/// Reasons a drag could not start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DragError {
    /// Dragging is turned off in the tree config.
    #[error("dragging is disabled")]
    Disabled,

    /// Another drag session is still in progress.
    #[error("drag session {0} is already active")]
    AlreadyActive(String),

    /// The node to drag is not part of the current tree.
    #[error("node '{0}' not found")]
    UnknownNode(String),
}

/// Reasons a rename could not start or commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    /// The trimmed label is empty. The session stays open.
    #[error("label must not be empty")]
    EmptyLabel,

    /// There is no rename in progress.
    #[error("no rename in progress")]
    NoActiveSession,

    /// The node to rename is not part of the current tree.
    #[error("node '{0}' not found")]
    UnknownNode(String),
}
