//! Scroll coordination
//!
//! The main content pane owns the only real scroll offset. The ruler and the
//! track-header sidebar are fixed viewports that translate their content by
//! the negated offset: `-x` for the ruler, `-y` for the sidebar.
//!
//! Offsets measured while laying out a frame are deferred and committed at the
//! start of the next frame, so no pane observes a write made mid-render.

use crate::structure::{ScrollOffset, TimelineState};
use egui::{Pos2, Rect, Vec2};

/// Where a pending offset came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollSource {
    /// Measured from the content pane's own scrolling.
    Pane,
    /// Requested programmatically (zoom anchoring, follow mode, commands);
    /// the content pane has to be told about it.
    Command,
}

#[derive(Clone, Debug)]
pub struct ScrollCoordinator {
    pending: Option<(ScrollOffset, ScrollSource)>,
    pane_sync: Option<ScrollOffset>,
    viewport: Vec2,
    content: Vec2,
    last_commit: Option<f64>,
    last_movement: Option<f64>,
    settle_secs: f64,
}

impl Default for ScrollCoordinator {
    fn default() -> Self {
        Self::new(0.15)
    }
}

impl ScrollCoordinator {
    pub fn new(settle_secs: f64) -> Self {
        Self {
            pending: None,
            pane_sync: None,
            viewport: Vec2::ZERO,
            content: Vec2::ZERO,
            last_commit: None,
            last_movement: None,
            settle_secs: settle_secs.max(0.0),
        }
    }

    pub fn set_viewport(&mut self, size: Vec2) {
        self.viewport = size;
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_content_size(&mut self, size: Vec2) {
        self.content = size;
    }

    pub fn content_size(&self) -> Vec2 {
        self.content
    }

    /// Largest offset that still shows content, per axis.
    pub fn max_offset(&self) -> ScrollOffset {
        ScrollOffset::new(
            (self.content.x - self.viewport.x).max(0.0) as f64,
            (self.content.y - self.viewport.y).max(0.0) as f64,
        )
    }

    pub fn clamp(&self, offset: ScrollOffset) -> ScrollOffset {
        let max = self.max_offset();
        let clamp_axis = |value: f64, max: f64| {
            if value.is_finite() {
                value.clamp(0.0, max)
            } else {
                0.0
            }
        };
        ScrollOffset::new(clamp_axis(offset.x, max.x), clamp_axis(offset.y, max.y))
    }

    /// Queue an offset for the next frame. The last request wins.
    pub fn defer(&mut self, offset: ScrollOffset, source: ScrollSource) {
        match self.pending {
            // A programmatic request outranks the pane echoing its old position.
            Some((_, ScrollSource::Command)) if source == ScrollSource::Pane => {}
            _ => self.pending = Some((offset, source)),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Commit the deferred offset. Returns true if the state changed.
    pub fn commit(&mut self, state: &mut TimelineState, now: f64) -> bool {
        let Some((requested, source)) = self.pending.take() else {
            self.settle(state, now);
            return false;
        };
        let previous = state.scroll_offset();
        let offset = self.clamp(requested);
        if source == ScrollSource::Command || offset != requested {
            self.pane_sync = Some(offset);
        }
        if offset == previous {
            self.settle(state, now);
            return false;
        }

        let distance = ((offset.x - previous.x).powi(2) + (offset.y - previous.y).powi(2)).sqrt();
        let speed = match self.last_commit {
            Some(last) if now > last => distance / (now - last),
            _ => 0.0,
        };
        state.set_scroll_offset(offset.x, offset.y);
        state.set_scrolling(true, speed);
        self.last_commit = Some(now);
        self.last_movement = Some(now);
        true
    }

    /// Mark scrolling as settled once no movement happened for a while.
    pub fn settle(&mut self, state: &mut TimelineState, now: f64) {
        self.last_commit = Some(now);
        if !state.is_scrolling() {
            return;
        }
        match self.last_movement {
            Some(last) if now - last < self.settle_secs => {}
            _ => {
                log::trace!("Scrolling settled");
                state.set_scrolling(false, 0.0);
            }
        }
    }

    /// Offset the content pane must adopt this frame, if any.
    pub fn take_pane_sync(&mut self) -> Option<ScrollOffset> {
        self.pane_sync.take()
    }

    pub fn ruler_translation(&self, state: &TimelineState) -> f64 {
        -state.scroll_offset().x
    }

    pub fn sidebar_translation(&self, state: &TimelineState) -> f64 {
        -state.scroll_offset().y
    }

    /// Visible part of the content, in content coordinates.
    pub fn visible_rect(&self, state: &TimelineState) -> Rect {
        let offset = state.scroll_offset();
        Rect::from_min_size(Pos2::new(offset.x as f32, offset.y as f32), self.viewport)
    }

    /// Scroll x that keeps the beat under `anchor_x` (viewport-relative) in
    /// place when the density changes from `old_ppb` to `new_ppb`.
    pub fn anchored_zoom_x(scroll_x: f64, anchor_x: f64, old_ppb: f64, new_ppb: f64) -> f64 {
        let beat = (scroll_x + anchor_x) / old_ppb;
        (beat * new_ppb - anchor_x).max(0.0)
    }
}
