//! egui surface
//!
//! [`TimelineEditor`] lays a toolbar, the bar ruler, the track-header sidebar,
//! the scrollable content pane and a status bar around a [`TimelineEngine`].
//! Only the content pane scrolls; the ruler and the sidebar follow it.
//! Pointer input on the content pane is recorded as [`Gesture`]s and reaches
//! the engine when the next frame begins, so all panes paint the same state.

mod clip;
mod renderer;
mod ruler;
mod statusbar;
mod toolbar;
mod track_header;

pub use clip::clip_rect;

use crate::editor::{TimelineCommand, TimelineEvent, Transport};
use crate::engine::TimelineEngine;
use crate::interaction::Gesture;
use crate::options::TimelineOptions;
use crate::structure::{track_at_y, Track, TrackId};
use clip::ClipRenderer;
use crossbeam_channel::Sender;
use egui::*;
use renderer::PaintPass;

const STATUSBAR_HEIGHT: f32 = 22.0;

pub struct TimelineEditor {
    engine: TimelineEngine,
    /// Content pane size from the last layout, used to begin the next frame.
    viewport: Vec2,
}

impl Default for TimelineEditor {
    fn default() -> Self {
        Self::new(TimelineOptions::default())
    }
}

impl TimelineEditor {
    pub fn new(options: TimelineOptions) -> Self {
        Self {
            engine: TimelineEngine::new(options),
            viewport: Vec2::ZERO,
        }
    }

    pub fn engine(&self) -> &TimelineEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TimelineEngine {
        &mut self.engine
    }

    pub fn set_event_listener(&mut self, listener: Box<dyn FnMut(&TimelineEvent)>) {
        self.engine.set_event_listener(listener);
    }

    pub fn take_events(&mut self) -> Vec<TimelineEvent> {
        self.engine.take_events()
    }

    pub fn execute_command(&mut self, command: TimelineCommand) {
        self.engine.execute_command(command);
    }

    pub fn command_sender(&self) -> Sender<TimelineCommand> {
        self.engine.command_sender()
    }

    pub fn ui(&mut self, ui: &mut Ui, tracks: &[Track], transport: &dyn Transport) {
        let now = ui.input(|i| i.time);
        self.engine.begin_frame(now, self.viewport, transport, tracks);
        let options = self.engine.options().clone();

        ui.vertical(|ui| {
            if options.show_toolbar {
                let queue = self.engine.queue().clone();
                let mut toolbar = toolbar::Toolbar::new(self.engine.state(), options.extend_step_bars);
                toolbar.set_snap(self.engine.snap_enabled());
                toolbar.set_follow_playhead(self.engine.follow_playhead());
                toolbar.set_playhead_beat(self.engine.displayed_playhead().unwrap_or(0.0));
                toolbar.ui(ui, &mut |command| queue.push(command));
                ui.separator();
            }

            let statusbar_height = if options.show_statusbar { STATUSBAR_HEIGHT } else { 0.0 };
            let full = ui.available_rect_before_wrap();
            let area = Rect::from_min_max(
                full.min,
                Pos2::new(full.max.x, (full.max.y - statusbar_height).max(full.min.y)),
            );
            let header_width = options.track_header_width.min(area.width());
            let ruler_height = options.ruler_height.min(area.height());

            let corner = Rect::from_min_size(area.min, Vec2::new(header_width, ruler_height));
            let ruler_rect = Rect::from_min_max(
                Pos2::new(area.min.x + header_width, area.min.y),
                Pos2::new(area.max.x, area.min.y + ruler_height),
            );
            let sidebar_rect = Rect::from_min_max(
                Pos2::new(area.min.x, area.min.y + ruler_height),
                Pos2::new(area.min.x + header_width, area.max.y),
            );
            let content_rect = Rect::from_min_max(
                Pos2::new(area.min.x + header_width, area.min.y + ruler_height),
                area.max,
            );
            self.viewport = content_rect.size();

            ui.painter().rect_filled(corner, 0.0, Color32::from_gray(35));
            self.ruler_ui(ui, ruler_rect);
            self.sidebar_ui(ui, sidebar_rect, tracks);
            self.content_ui(ui, content_rect, tracks, now);
            ui.advance_cursor_after_rect(area);

            if options.show_statusbar {
                let stats = self.engine.renderer().tiles().stats();
                statusbar::StatusBar::new(self.engine.state(), tracks.len(), stats).ui(ui);
            }
        });

        if self.engine.needs_repaint() || transport.is_playing() {
            ui.ctx().request_repaint();
        }
    }

    fn ruler_ui(&mut self, ui: &mut Ui, rect: Rect) {
        let scroll_x = self.engine.state().scroll_offset().x;
        let visible = Rect::from_min_size(Pos2::new(scroll_x as f32, 0.0), rect.size());
        let lines = self.engine.ruler_lines(visible);

        let state = self.engine.state();
        let translation = self.engine.scroll().ruler_translation(state);
        let mut ruler = ruler::Ruler::new(
            &lines,
            translation,
            state.effective_pixels_per_beat(),
            state.beats_per_bar(),
            state.content_width(),
        );
        ruler.set_playhead(
            self.engine
                .displayed_playhead()
                .map(|beat| state.beat_to_x(beat) as f32),
        );
        let response = ruler.ui(ui, rect);

        if response.clicked() || response.dragged_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let beat = state.x_to_beat((pos.x - rect.min.x) as f64 - translation);
                self.engine.seek(beat);
            }
        }
    }

    fn sidebar_ui(&self, ui: &mut Ui, rect: Rect, tracks: &[Track]) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(40));

        let state = self.engine.state();
        let selected = state.selection().visible_range().map(|(track_id, _)| track_id);
        let mut top = rect.min.y + self.engine.scroll().sidebar_translation(state) as f32;
        for track in tracks {
            let cell = Rect::from_min_size(Pos2::new(rect.min.x, top), Vec2::new(rect.width(), track.height));
            top += track.height;
            if !cell.intersects(rect) {
                continue;
            }
            let mut header = track_header::TrackHeader::new(track);
            header.set_selected(selected == Some(track.id));
            header.paint(&painter, cell);
        }
    }

    fn content_ui(&mut self, ui: &mut Ui, rect: Rect, tracks: &[Track], now: f64) {
        let mut area = ScrollArea::both()
            .id_salt("egui_timeline_content")
            .auto_shrink([false, false]);
        if let Some(offset) = self.engine.take_pane_sync() {
            area = area.scroll_offset(Vec2::new(offset.x as f32, offset.y as f32));
        }
        let content = self.engine.content_size(tracks);
        let size = Vec2::new(content.x, content.y.max(rect.height()));

        let output = ui
            .allocate_new_ui(UiBuilder::new().max_rect(rect), |ui| {
                area.show_viewport(ui, |ui, viewport| {
                    let (content_rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());
                    self.content_frame(ui, content_rect.min, viewport, &response, tracks, now);
                })
            })
            .inner;

        self.engine
            .report_pane_offset(output.state.offset.x as f64, output.state.offset.y as f64);
    }

    fn locate(&self, pos: Pos2, origin: Pos2, tracks: &[Track]) -> (Option<TrackId>, f64) {
        let local = pos - origin;
        let beat = self.engine.state().x_to_beat(local.x as f64);
        let track_id = track_at_y(tracks, local.y).map(|(_, track)| track.id);
        (track_id, beat)
    }

    fn handle_pointer(
        &mut self,
        ui: &Ui,
        response: &Response,
        origin: Pos2,
        screen_viewport: Rect,
        tracks: &[Track],
        now: f64,
    ) {
        let (pointer, primary_pressed, secondary_pressed, primary_released, zoom_delta, escape) =
            ui.input(|i| {
                (
                    i.pointer.interact_pos(),
                    i.pointer.primary_pressed(),
                    i.pointer.secondary_pressed(),
                    i.pointer.primary_released(),
                    i.zoom_delta(),
                    i.key_pressed(Key::Escape),
                )
            });

        if escape {
            self.engine.push_gesture(Gesture::Cancelled);
        }

        let Some(pos) = pointer else {
            if primary_released {
                self.engine.push_gesture(Gesture::Released { beat: None });
            }
            return;
        };
        let (track_id, beat) = self.locate(pos, origin, tracks);

        if response.hovered() {
            for (button, pressed) in [
                (PointerButton::Primary, primary_pressed),
                (PointerButton::Secondary, secondary_pressed),
            ] {
                if pressed {
                    self.engine.push_gesture(Gesture::Pressed {
                        button,
                        track_id,
                        beat,
                        time: now,
                    });
                }
            }
            if zoom_delta != 1.0 {
                let anchor_x = Some((pos.x - screen_viewport.min.x) as f64);
                self.engine.queue().push(if zoom_delta > 1.0 {
                    TimelineCommand::ZoomIn { anchor_x }
                } else {
                    TimelineCommand::ZoomOut { anchor_x }
                });
            }
        }
        if response.dragged_by(PointerButton::Primary) {
            self.engine.push_gesture(Gesture::Dragged { beat });
        }
        if primary_released {
            self.engine.push_gesture(Gesture::Released { beat: Some(beat) });
        }
    }

    fn context_menu(&mut self, response: &Response) {
        let queue = self.engine.queue().clone();
        let has_selection = self.engine.state().normalized_selection_range().is_some();
        let extend_step_bars = self.engine.options().extend_step_bars;
        let mut closed = false;
        response.context_menu(|ui| {
            if ui
                .add_enabled(has_selection, Button::new("Clear selection"))
                .clicked()
            {
                queue.push(TimelineCommand::ClearSelection);
                closed = true;
                ui.close_menu();
            }
            if ui
                .button(format!("Extend timeline by {} bars", extend_step_bars))
                .clicked()
            {
                queue.push(TimelineCommand::ExtendTimeline { bars: extend_step_bars });
                closed = true;
                ui.close_menu();
            }
        });
        if closed {
            self.engine.push_gesture(Gesture::MenuClosed);
        }
    }

    fn content_frame(
        &mut self,
        ui: &mut Ui,
        origin: Pos2,
        viewport: Rect,
        response: &Response,
        tracks: &[Track],
        now: f64,
    ) {
        let screen_viewport = viewport.translate(origin.to_vec2());
        self.handle_pointer(ui, response, origin, screen_viewport, tracks, now);
        self.context_menu(response);

        let painter = ui.painter_at(screen_viewport);
        painter.rect_filled(screen_viewport, 0.0, Color32::from_gray(30));

        let commands = self.engine.draw(viewport, tracks);
        let (top, bottom) = (screen_viewport.min.y, screen_viewport.max.y);
        renderer::paint_commands(&painter, &commands, origin, top, bottom, PaintPass::Background);

        let state = self.engine.state();
        let dragged = self.engine.dragged_clip();
        let min_clip_width = self.engine.options().min_clip_width;
        let hover = response.hover_pos();
        let mut over_clip = false;
        let mut track_top = 0.0;
        for track in tracks {
            let track_bottom = origin.y + track_top + track.height;
            painter.line_segment(
                [
                    Pos2::new(screen_viewport.min.x, track_bottom),
                    Pos2::new(screen_viewport.max.x, track_bottom),
                ],
                Stroke::new(1.0, Color32::from_gray(20)),
            );
            for clip in &track.clips {
                let rect = clip_rect(clip, state, track_top, track.height, min_clip_width);
                if !rect.intersects(viewport) {
                    continue;
                }
                let mut clip_renderer = ClipRenderer::new(clip, rect.translate(origin.to_vec2()));
                clip_renderer.set_dragged(dragged == Some(clip.id));
                clip_renderer.render(&painter);
                over_clip |= hover.map_or(false, |pos| clip_renderer.hit_test(pos));
            }
            track_top += track.height;
        }
        if dragged.is_some() {
            ui.ctx().set_cursor_icon(CursorIcon::Grabbing);
        } else if over_clip {
            ui.ctx().set_cursor_icon(CursorIcon::Grab);
        }

        renderer::paint_commands(&painter, &commands, origin, top, bottom, PaintPass::Overlay);
    }
}
