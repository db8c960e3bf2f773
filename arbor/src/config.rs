//! Tree engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Per-tree configuration.
///
/// Built with consuming setters or deserialized from host configuration.
/// Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Fixed height of every row.
    pub row_height: f32,

    /// Extra rows materialized beyond each viewport edge.
    pub overscan: usize,

    /// Whether Ctrl/Cmd toggle and Shift range selection are honored.
    /// When false both degrade to replacing the selection.
    pub multi_select: bool,

    /// Whether rows can be dragged.
    pub allow_drag: bool,

    /// Whether rows accept drops.
    pub allow_drop: bool,

    /// Emit renamed labels qualified with their ancestor path.
    pub full_path_labels: bool,

    /// Separator used by full-path labels.
    pub path_separator: String,

    /// How long a scroll-to-node request waits before its single retry.
    pub scroll_retry_ms: u64,

    /// How long a collapsed container must stay hovered during a drag
    /// before it auto-expands.
    pub hover_expand_ms: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            row_height: 32.0,
            overscan: 10,
            multi_select: true,
            allow_drag: true,
            allow_drop: true,
            full_path_labels: false,
            path_separator: "/".to_string(),
            scroll_retry_ms: 150,
            hover_expand_ms: 500,
        }
    }
}

impl TreeConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row height. Non-positive values are ignored.
    pub fn row_height(mut self, height: f32) -> Self {
        if height > 0.0 {
            self.row_height = height;
        }
        self
    }

    /// Set the overscan row count.
    pub fn overscan(mut self, rows: usize) -> Self {
        self.overscan = rows;
        self
    }

    /// Enable or disable multi-selection.
    pub fn multi_select(mut self, enabled: bool) -> Self {
        self.multi_select = enabled;
        self
    }

    /// Enable or disable dragging rows.
    pub fn allow_drag(mut self, enabled: bool) -> Self {
        self.allow_drag = enabled;
        self
    }

    /// Enable or disable dropping onto rows.
    pub fn allow_drop(mut self, enabled: bool) -> Self {
        self.allow_drop = enabled;
        self
    }

    /// Emit renamed labels as full paths joined by `separator`.
    pub fn full_path_labels(mut self, separator: impl Into<String>) -> Self {
        self.full_path_labels = true;
        self.path_separator = separator.into();
        self
    }

    /// Set the scroll-to-node retry delay.
    pub fn scroll_retry(mut self, delay: Duration) -> Self {
        self.scroll_retry_ms = delay.as_millis() as u64;
        self
    }

    /// Set the hover auto-expand delay.
    pub fn hover_expand(mut self, delay: Duration) -> Self {
        self.hover_expand_ms = delay.as_millis() as u64;
        self
    }

    /// Scroll-to-node retry delay.
    pub fn scroll_retry_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_retry_ms)
    }

    /// Hover auto-expand delay.
    pub fn hover_expand_delay(&self) -> Duration {
        Duration::from_millis(self.hover_expand_ms)
    }

    /// Row height, falling back to the default when misconfigured.
    pub(crate) fn effective_row_height(&self) -> f32 {
        if self.row_height > 0.0 && self.row_height.is_finite() {
            self.row_height
        } else {
            Self::default().row_height
        }
    }
}
