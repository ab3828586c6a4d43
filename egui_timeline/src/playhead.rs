//! Playhead tracking
//!
//! Converts the transport's current beat into a pane position and decides
//! whether the playhead needs drawing at all.

/// Slack around the viewport, in pixels, before the playhead counts as hidden.
pub const VISIBILITY_EPSILON: f64 = 1.0;

/// How quickly a scrubbed playhead catches up with its target, per second.
const SCRUB_RATE: f64 = 18.0;
const SCRUB_SNAP_BEATS: f64 = 0.001;

/// Playhead x relative to a pane scrolled by `scroll_x`.
pub fn position(current_beat: f64, pixels_per_beat: f64, scroll_x: f64) -> f64 {
    absolute_position(current_beat, pixels_per_beat) - scroll_x
}

/// Playhead x in absolute timeline coordinates.
pub fn absolute_position(current_beat: f64, pixels_per_beat: f64) -> f64 {
    current_beat * pixels_per_beat
}

pub fn is_visible(position: f64, visible_min_x: f64, visible_max_x: f64) -> bool {
    position >= visible_min_x - VISIBILITY_EPSILON && position <= visible_max_x + VISIBILITY_EPSILON
}

/// Scroll x that brings a playing playhead back into view, if it has run
/// past the right quarter of the viewport or left it entirely.
pub fn follow_scroll(playhead_x: f64, scroll_x: f64, viewport_width: f64) -> Option<f64> {
    if viewport_width <= 0.0 {
        return None;
    }
    let right_edge = scroll_x + viewport_width * 0.75;
    if playhead_x > right_edge || playhead_x < scroll_x {
        Some((playhead_x - viewport_width * 0.25).max(0.0))
    } else {
        None
    }
}

/// Smooths manual scrubbing; playback positions are shown as-is.
#[derive(Clone, Debug, Default)]
pub struct PlayheadTracker {
    displayed_beat: Option<f64>,
}

impl PlayheadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn displayed_beat(&self) -> Option<f64> {
        self.displayed_beat
    }

    /// Advance towards `target_beat` and return the beat to draw.
    pub fn update(&mut self, target_beat: f64, is_playing: bool, dt: f64) -> f64 {
        let target = if target_beat.is_finite() { target_beat.max(0.0) } else { 0.0 };
        let shown = match self.displayed_beat {
            Some(current) if !is_playing && dt > 0.0 => {
                let blend = 1.0 - (-SCRUB_RATE * dt).exp();
                let next = current + (target - current) * blend;
                if (target - next).abs() < SCRUB_SNAP_BEATS {
                    target
                } else {
                    next
                }
            }
            _ => target,
        };
        self.displayed_beat = Some(shown);
        shown
    }

    /// True while a scrub animation is still catching up.
    pub fn is_animating(&self, target_beat: f64) -> bool {
        self.displayed_beat
            .map(|shown| (shown - target_beat).abs() >= SCRUB_SNAP_BEATS)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_in_pane_and_absolute() {
        assert_eq!(position(8.0, 50.0, 100.0), 300.0);
        assert_eq!(absolute_position(8.0, 50.0), 400.0);
    }

    #[test]
    fn hidden_strictly_outside_the_viewport() {
        let scroll_x = 1_000.0;
        let width = 800.0;
        let ppb = 40.0;
        for step in 0..4_000 {
            let beat = step as f64 * 0.0125;
            let x = absolute_position(beat, ppb);
            let visible = is_visible(x, scroll_x, scroll_x + width);
            if x < scroll_x - 1.0 || x > scroll_x + width + 1.0 {
                assert!(!visible, "beat {beat} at x {x}");
            } else {
                assert!(visible, "beat {beat} at x {x}");
            }
        }
    }

    #[test]
    fn follow_pages_when_leaving_the_view() {
        assert_eq!(follow_scroll(500.0, 0.0, 800.0), None);
        assert_eq!(follow_scroll(700.0, 0.0, 800.0), Some(500.0));
        assert_eq!(follow_scroll(100.0, 400.0, 800.0), Some(0.0));
        assert_eq!(follow_scroll(100.0, 0.0, 0.0), None);
    }

    #[test]
    fn playback_is_not_animated() {
        let mut tracker = PlayheadTracker::new();
        tracker.update(0.0, true, 0.016);
        assert_eq!(tracker.update(12.0, true, 0.016), 12.0);
    }

    #[test]
    fn scrubbing_eases_towards_the_target() {
        let mut tracker = PlayheadTracker::new();
        tracker.update(0.0, false, 0.016);
        let first = tracker.update(8.0, false, 0.016);
        assert!(first > 0.0 && first < 8.0);
        assert!(tracker.is_animating(8.0));
        let mut shown = first;
        for _ in 0..120 {
            shown = tracker.update(8.0, false, 0.016);
        }
        assert_eq!(shown, 8.0);
        assert!(!tracker.is_animating(8.0));
    }
}
