//! Inline rename sessions.

use log::debug;

use crate::drag::SessionId;
use crate::error::RenameError;

/// An in-flight rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameSession {
    /// Session id.
    pub id: SessionId,
    /// Node being renamed.
    pub node_id: String,
    /// In-progress text.
    pub text: String,
}

/// A validated rename, ready to emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameCommit {
    /// Node that was renamed.
    pub node_id: String,
    /// Trimmed new label, without any path qualification.
    pub label: String,
}

/// Owns at most one rename session.
#[derive(Debug, Default)]
pub struct RenameController {
    session: Option<RenameSession>,
}

impl RenameController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active session.
    pub fn session(&self) -> Option<&RenameSession> {
        self.session.as_ref()
    }

    /// Check if a rename is in progress.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Check if `node_id` is being renamed.
    pub fn is_renaming(&self, node_id: &str) -> bool {
        self.session.as_ref().is_some_and(|s| s.node_id == node_id)
    }

    /// Start renaming a node, cancelling any uncommitted session.
    pub fn start(&mut self, node_id: &str, initial_text: &str) -> SessionId {
        if let Some(previous) = self.session.take() {
            debug!(
                "Rename of '{}' superseded by '{}'",
                previous.node_id, node_id
            );
        }
        let id = SessionId::new();
        debug!("Rename {} started for '{}'", id, node_id);
        self.session = Some(RenameSession {
            id,
            node_id: node_id.to_string(),
            text: initial_text.to_string(),
        });
        id
    }

    /// Replace the in-progress text.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match self.session.as_mut() {
            Some(session) => {
                session.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Append a character to the in-progress text.
    pub fn push_char(&mut self, c: char) -> bool {
        match self.session.as_mut() {
            Some(session) => {
                session.text.push(c);
                true
            }
            None => false,
        }
    }

    /// Remove the last character of the in-progress text.
    pub fn pop_char(&mut self) -> bool {
        self.session
            .as_mut()
            .is_some_and(|session| session.text.pop().is_some())
    }

    /// Commit `new_label`.
    ///
    /// Blank labels are refused and leave the session open.
    pub fn commit(&mut self, new_label: &str) -> Result<RenameCommit, RenameError> {
        let session = self.session.as_ref().ok_or(RenameError::NoActiveSession)?;
        let label = new_label.trim();
        if label.is_empty() {
            debug!("Rename {} refused: empty label", session.id);
            return Err(RenameError::EmptyLabel);
        }
        let commit = RenameCommit {
            node_id: session.node_id.clone(),
            label: label.to_string(),
        };
        debug!("Rename {} committed '{}'", session.id, commit.label);
        self.session = None;
        Ok(commit)
    }

    /// Commit the in-progress text.
    pub fn commit_text(&mut self) -> Result<RenameCommit, RenameError> {
        let text = self
            .session
            .as_ref()
            .map(|s| s.text.clone())
            .ok_or(RenameError::NoActiveSession)?;
        self.commit(&text)
    }

    /// Discard the session. No-op when nothing is active.
    pub fn cancel(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                debug!("Rename {} cancelled", session.id);
                true
            }
            None => false,
        }
    }
}
