//! Status bar module
//!
//! Read-only summary line under the timeline: zoom, length, selection and
//! render statistics.

use crate::render::TileStats;
use crate::structure::TimelineState;
use crate::utils::format_range;
use egui::*;

pub struct StatusBar<'a> {
    state: &'a TimelineState,
    track_count: usize,
    tiles: TileStats,
}

impl<'a> StatusBar<'a> {
    pub fn new(state: &'a TimelineState, track_count: usize, tiles: TileStats) -> Self {
        Self {
            state,
            track_count,
            tiles,
        }
    }

    pub fn ui(&self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(format!(
                "Zoom {} ({:.1} px/beat)",
                self.state.zoom_level(),
                self.state.effective_pixels_per_beat()
            ));
            ui.separator();

            ui.label(format!("Bars: {}", self.state.total_bars()));
            ui.separator();

            ui.label(format!("Tracks: {}", self.track_count));
            ui.separator();

            match self.state.normalized_selection_range() {
                Some(range) => {
                    ui.label(format!(
                        "Selection: {}",
                        format_range(range, self.state.beats_per_bar())
                    ));
                }
                None => {
                    ui.label("Selection: none");
                }
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(
                    RichText::new(format!(
                        "tiles {} cached, {} built",
                        self.tiles.cached, self.tiles.built
                    ))
                    .weak(),
                );
                if self.state.is_scrolling() {
                    ui.label(RichText::new("scrolling").weak());
                }
            });
        });
    }
}
