//! Virtualization window and scroll state.
//!
//! Only rows inside the window are materialized. Each row is placed at
//! `index * row_height`, so the host positions rows absolutely and never lays
//! out rows outside the window.

use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::flatten::FlatView;

/// The contiguous range of visible rows to materialize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualWindow {
    /// First materialized index into the visible rows.
    pub start_index: usize,
    /// One past the last materialized index.
    pub end_index: usize,
    /// Fixed row height.
    pub row_height: f32,
    /// Height of the whole scroll track.
    pub total_height: f32,
}

impl VirtualWindow {
    /// Compute the window for `len` visible rows.
    pub fn compute(
        len: usize,
        scroll_top: f32,
        viewport_height: f32,
        row_height: f32,
        overscan: usize,
    ) -> Self {
        let total_height = len as f32 * row_height;
        if len == 0 || row_height <= 0.0 {
            return Self {
                start_index: 0,
                end_index: 0,
                row_height,
                total_height,
            };
        }

        let first = (scroll_top.max(0.0) / row_height).floor() as usize;
        let rows_in_view = (viewport_height.max(0.0) / row_height).ceil() as usize;
        let start_index = first.saturating_sub(overscan).min(len);
        let end_index = first
            .saturating_add(rows_in_view)
            .saturating_add(overscan)
            .min(len);

        Self {
            start_index,
            end_index: end_index.max(start_index),
            row_height,
            total_height,
        }
    }

    /// Number of materialized rows.
    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    /// Check if nothing is materialized.
    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Check if a visible index is materialized.
    pub fn contains(&self, index: usize) -> bool {
        (self.start_index..self.end_index).contains(&index)
    }

    /// Absolute offset of a row.
    pub fn offset_of(&self, index: usize) -> f32 {
        index as f32 * self.row_height
    }

    /// The materialized index range.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start_index..self.end_index
    }
}

/// A deferred scroll-to-node request awaiting its retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingScroll {
    /// Node to scroll to.
    pub node_id: String,
    /// When the retry runs.
    pub deadline: Instant,
    /// Generation token; newer requests supersede older ones.
    pub generation: u64,
}

/// Scroll offset, viewport size, and the pending scroll-to-node request.
#[derive(Debug, Clone)]
pub struct Viewport {
    scroll_top: f32,
    height: f32,
    row_height: f32,
    overscan: usize,
    pending: Option<PendingScroll>,
    generation: u64,
}

impl Viewport {
    /// Create a viewport with no height yet.
    pub fn new(row_height: f32, overscan: usize) -> Self {
        Self {
            scroll_top: 0.0,
            height: 0.0,
            row_height,
            overscan,
            pending: None,
            generation: 0,
        }
    }

    /// Current scroll offset.
    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    /// Viewport height.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Fixed row height.
    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    /// Overscan row count.
    pub fn overscan(&self) -> usize {
        self.overscan
    }

    /// Maximum scroll offset for `len` visible rows.
    pub fn max_scroll_top(&self, len: usize) -> f32 {
        (len as f32 * self.row_height - self.height).max(0.0)
    }

    /// Set the viewport height (called on resize). Returns true if the scroll
    /// offset had to be clamped.
    pub fn set_height(&mut self, height: f32, len: usize) -> bool {
        self.height = height.max(0.0);
        self.clamp(len)
    }

    /// Scroll to an absolute offset, clamped. Returns true if it moved.
    pub fn scroll_to(&mut self, offset: f32, len: usize) -> bool {
        let clamped = offset.clamp(0.0, self.max_scroll_top(len));
        if clamped != self.scroll_top {
            self.scroll_top = clamped;
            return true;
        }
        false
    }

    /// Scroll by a relative amount, clamped.
    pub fn scroll_by(&mut self, delta: f32, len: usize) -> bool {
        self.scroll_to(self.scroll_top + delta, len)
    }

    /// Re-clamp after the row count changed.
    pub fn clamp(&mut self, len: usize) -> bool {
        self.scroll_to(self.scroll_top, len)
    }

    /// The window to materialize for `len` visible rows.
    pub fn window(&self, len: usize) -> VirtualWindow {
        let window = VirtualWindow::compute(
            len,
            self.scroll_top,
            self.height,
            self.row_height,
            self.overscan,
        );
        trace!(
            "Window {}..{} of {} (scroll_top={})",
            window.start_index, window.end_index, len, self.scroll_top
        );
        window
    }

    /// Scroll so the row at `index` is in view.
    ///
    /// Does nothing when the row is already materialized. Rows above the
    /// window align to the top edge, rows below to the bottom edge.
    pub fn scroll_to_index(&mut self, index: usize, len: usize) -> bool {
        if index >= len || self.window(len).contains(index) {
            return false;
        }
        let top = index as f32 * self.row_height;
        let target = if top < self.scroll_top {
            top
        } else {
            top + self.row_height - self.height
        };
        self.scroll_to(target, len)
    }

    /// Scroll the least distance that puts the whole row at `index` on screen.
    ///
    /// Overscan rows count as off screen here.
    pub fn scroll_into_view(&mut self, index: usize, len: usize) -> bool {
        if index >= len || self.height <= 0.0 {
            return false;
        }
        let top = index as f32 * self.row_height;
        let bottom = top + self.row_height;
        if top < self.scroll_top {
            self.scroll_to(top, len)
        } else if bottom > self.scroll_top + self.height {
            self.scroll_to(bottom - self.height, len)
        } else {
            false
        }
    }

    /// Scroll to a node, deferring one retry if it is not visible yet.
    ///
    /// Any earlier pending request is superseded. Returns true if the scroll
    /// offset changed now.
    pub fn request_scroll_to(
        &mut self,
        view: &FlatView,
        node_id: &str,
        now: Instant,
        retry_delay: Duration,
    ) -> bool {
        self.generation += 1;
        self.pending = None;

        match view.visible_index_of(node_id) {
            Some(index) => self.scroll_to_index(index, view.visible_len()),
            None => {
                debug!(
                    "Scroll to '{}' deferred by {:?} (generation {})",
                    node_id, retry_delay, self.generation
                );
                self.pending = Some(PendingScroll {
                    node_id: node_id.to_string(),
                    deadline: now + retry_delay,
                    generation: self.generation,
                });
                false
            }
        }
    }

    /// Run the pending retry once its deadline has passed.
    ///
    /// The request is consumed either way; a node that is still not visible
    /// is dropped silently. Returns true if the scroll offset changed.
    pub fn poll(&mut self, view: &FlatView, now: Instant) -> bool {
        match &self.pending {
            Some(pending) if now >= pending.deadline => {}
            _ => return false,
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };
        match view.visible_index_of(&pending.node_id) {
            Some(index) => self.scroll_to_index(index, view.visible_len()),
            None => {
                debug!(
                    "Scroll to '{}' expired (generation {})",
                    pending.node_id, pending.generation
                );
                false
            }
        }
    }

    /// The pending request, if any.
    pub fn pending(&self) -> Option<&PendingScroll> {
        self.pending.as_ref()
    }

    /// Drop any pending request.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }
}
