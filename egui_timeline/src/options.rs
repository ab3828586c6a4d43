//! Editor options
//!
//! Layout and behaviour knobs for [`crate::TimelineEditor`]. Hosts can build
//! them in code or load them from a JSON document; missing fields fall back to
//! the defaults.

use crate::error::TimelineError;
use crate::grid::MAX_ZOOM_LEVEL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineOptions {
    pub track_header_width: f32,
    pub ruler_height: f32,
    pub min_clip_width: f32,
    /// Pixels per beat at zoom factor 1.0.
    pub pixels_per_beat_base: f64,
    pub initial_zoom_level: u8,
    pub initial_bars: u32,
    /// Bars appended by the "extend timeline" affordance.
    pub extend_step_bars: u32,
    /// Extra width rendered on both sides of the viewport.
    pub viewport_margin: f64,
    pub tile_width: f64,
    /// Scroll speed (px/s) above which fine subdivisions are suppressed.
    pub fast_scroll_speed: f64,
    pub scroll_settle_secs: f64,
    pub right_click_release_secs: f64,
    /// Minimum selection span in beats.
    pub selection_epsilon: f64,
    pub snap_enabled: bool,
    pub follow_playhead: bool,
    pub show_toolbar: bool,
    pub show_statusbar: bool,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            track_header_width: 200.0,
            ruler_height: 32.0,
            min_clip_width: 4.0,
            pixels_per_beat_base: 80.0,
            initial_zoom_level: 3,
            initial_bars: 64,
            extend_step_bars: 16,
            viewport_margin: 100.0,
            tile_width: 1024.0,
            fast_scroll_speed: 3000.0,
            scroll_settle_secs: 0.15,
            right_click_release_secs: 0.2,
            selection_epsilon: 0.001,
            snap_enabled: true,
            follow_playhead: true,
            show_toolbar: true,
            show_statusbar: true,
        }
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), TimelineError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TimelineError::InvalidOption {
            field,
            reason: format!("must be a positive number, got {}", value),
        })
    }
}

impl TimelineOptions {
    pub fn from_json_str(json: &str) -> Result<Self, TimelineError> {
        let options: TimelineOptions = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, TimelineError> {
        let json = fs::read_to_string(path)?;
        let options = Self::from_json_str(&json)?;
        log::debug!("Loaded timeline options from {:?}", path);
        Ok(options)
    }

    pub fn to_json_string(&self) -> Result<String, TimelineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        require_positive("track_header_width", self.track_header_width as f64)?;
        require_positive("ruler_height", self.ruler_height as f64)?;
        require_positive("pixels_per_beat_base", self.pixels_per_beat_base)?;
        require_positive("tile_width", self.tile_width)?;
        require_positive("fast_scroll_speed", self.fast_scroll_speed)?;
        require_positive("selection_epsilon", self.selection_epsilon)?;
        if self.viewport_margin < 0.0 || !self.viewport_margin.is_finite() {
            return Err(TimelineError::InvalidOption {
                field: "viewport_margin",
                reason: "must be zero or positive".to_string(),
            });
        }
        if self.scroll_settle_secs < 0.0 || self.right_click_release_secs < 0.0 {
            return Err(TimelineError::InvalidOption {
                field: "scroll_settle_secs",
                reason: "delays cannot be negative".to_string(),
            });
        }
        if self.initial_zoom_level > MAX_ZOOM_LEVEL {
            return Err(TimelineError::InvalidOption {
                field: "initial_zoom_level",
                reason: format!("must be at most {}", MAX_ZOOM_LEVEL),
            });
        }
        if self.initial_bars == 0 {
            return Err(TimelineError::InvalidOption {
                field: "initial_bars",
                reason: "timeline needs at least one bar".to_string(),
            });
        }
        Ok(())
    }
}
