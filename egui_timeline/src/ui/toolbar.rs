//! Toolbar module
//!
//! Zoom controls, the current grid division, timeline extension and the
//! snap / follow toggles.

use crate::editor::TimelineCommand;
use crate::grid::{MAX_ZOOM_LEVEL, MIN_ZOOM_LEVEL};
use crate::structure::TimelineState;
use crate::utils::format_position;
use egui::*;

pub struct Toolbar<'a> {
    state: &'a TimelineState,
    snap_enabled: bool,
    follow_playhead: bool,
    extend_step_bars: u32,
    playhead_beat: f64,
}

impl<'a> Toolbar<'a> {
    pub fn new(state: &'a TimelineState, extend_step_bars: u32) -> Self {
        Self {
            state,
            snap_enabled: true,
            follow_playhead: true,
            extend_step_bars,
            playhead_beat: 0.0,
        }
    }

    pub fn set_snap(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    pub fn set_follow_playhead(&mut self, enabled: bool) {
        self.follow_playhead = enabled;
    }

    pub fn set_playhead_beat(&mut self, beat: f64) {
        self.playhead_beat = beat;
    }

    pub fn ui(&mut self, ui: &mut Ui, command_callback: &mut dyn FnMut(TimelineCommand)) {
        ui.horizontal(|ui| {
            ui.label(format!(
                "Position: {}",
                format_position(self.playhead_beat, self.state.beats_per_bar())
            ));
            ui.separator();

            let level = self.state.zoom_level();
            if ui
                .add_enabled(level < MAX_ZOOM_LEVEL, Button::new("➖"))
                .on_hover_text("Zoom out")
                .clicked()
            {
                command_callback(TimelineCommand::ZoomOut { anchor_x: None });
            }
            if ui
                .add_enabled(level > MIN_ZOOM_LEVEL, Button::new("➕"))
                .on_hover_text("Zoom in")
                .clicked()
            {
                command_callback(TimelineCommand::ZoomIn { anchor_x: None });
            }
            ui.label(format!("Grid: {}", self.state.grid_division().label()));

            ui.separator();

            if ui
                .button(format!("Extend +{}", self.extend_step_bars))
                .on_hover_text("Append bars to the end of the timeline")
                .clicked()
            {
                command_callback(TimelineCommand::ExtendTimeline {
                    bars: self.extend_step_bars,
                });
            }

            ui.separator();

            let mut snap_enabled = self.snap_enabled;
            if ui.checkbox(&mut snap_enabled, "Snap").changed() {
                command_callback(TimelineCommand::SetSnap { enabled: snap_enabled });
            }
            let mut follow = self.follow_playhead;
            if ui.checkbox(&mut follow, "Follow").changed() {
                command_callback(TimelineCommand::SetFollowPlayhead { enabled: follow });
            }
        });
    }
}
