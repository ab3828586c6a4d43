//! Timeline engine
//!
//! Owns the [`TimelineState`] and every controller that is allowed to touch
//! it. The engine knows nothing about egui widgets: the host (or
//! [`crate::TimelineEditor`]) feeds it frame boundaries, pointer gestures in
//! beat space and commands, and reads back draw commands and events.
//!
//! Per frame:
//!
//! 1. [`TimelineEngine::begin_frame`] drains queued commands, applies the
//!    pointer gestures recorded during the previous layout, mirrors the
//!    transport, grows the timeline and commits the deferred scroll offset.
//! 2. [`TimelineEngine::draw`] derives the visuals. Input seen while painting
//!    is recorded with [`TimelineEngine::push_gesture`].

use crate::editor::{CommandQueue, TimelineCommand, TimelineEvent, Transport};
use crate::grid::LineKind;
use crate::interaction::{classify_press, Gesture, InteractionArbiter, InteractionKind};
use crate::options::TimelineOptions;
use crate::playhead::{self, PlayheadTracker};
use crate::render::{DrawCommand, GridRenderer};
use crate::scroll::{ScrollCoordinator, ScrollSource};
use crate::selection::{SelectionController, SelectionOutcome};
use crate::snap::{sanitize_beat, snap};
use crate::structure::{tracks_height, ClipId, ClipOccupancy, ScrollOffset, TimelineState, Track, TrackId};
use crossbeam_channel::Sender;
use egui::{PointerButton, Rect, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
struct ClipDrag {
    clip_id: ClipId,
    track_id: TrackId,
    grab_beat: f64,
    origin_start: f64,
    new_start: f64,
}

pub struct TimelineEngine {
    state: TimelineState,
    options: TimelineOptions,
    scroll: ScrollCoordinator,
    arbiter: InteractionArbiter,
    selection: SelectionController,
    playhead: PlayheadTracker,
    renderer: GridRenderer,
    queue: CommandQueue,
    gestures: Vec<Gesture>,
    clip_drag: Option<ClipDrag>,
    follow_playhead: bool,
    playhead_target: f64,
    last_frame: Option<f64>,

    pending_events: Vec<TimelineEvent>,
    event_listener: Option<Box<dyn FnMut(&TimelineEvent)>>,
}

impl Default for TimelineEngine {
    fn default() -> Self {
        Self::new(TimelineOptions::default())
    }
}

impl TimelineEngine {
    pub fn new(options: TimelineOptions) -> Self {
        let options = match options.validate() {
            Ok(()) => options,
            Err(err) => {
                log::warn!("{}, falling back to default options", err);
                TimelineOptions::default()
            }
        };
        Self {
            state: TimelineState::new(
                options.pixels_per_beat_base,
                options.initial_zoom_level as i32,
                options.initial_bars,
            ),
            scroll: ScrollCoordinator::new(options.scroll_settle_secs),
            arbiter: InteractionArbiter::new(options.right_click_release_secs),
            selection: SelectionController::new(options.selection_epsilon, options.snap_enabled),
            playhead: PlayheadTracker::new(),
            renderer: GridRenderer::new(
                options.tile_width,
                options.viewport_margin,
                options.fast_scroll_speed,
            ),
            queue: CommandQueue::new(),
            gestures: Vec::new(),
            clip_drag: None,
            follow_playhead: options.follow_playhead,
            playhead_target: 0.0,
            last_frame: None,
            pending_events: Vec::new(),
            event_listener: None,
            options,
        }
    }

    pub fn set_event_listener(&mut self, listener: Box<dyn FnMut(&TimelineEvent)>) {
        self.event_listener = Some(listener);
    }

    pub fn take_events(&mut self) -> Vec<TimelineEvent> {
        std::mem::take(&mut self.pending_events)
    }

    fn emit_event(&mut self, event: TimelineEvent) {
        if let Some(ref mut listener) = self.event_listener {
            listener(&event);
        }
        self.pending_events.push(event);
    }

    /// Sender for commands applied at the start of the next frame.
    pub fn command_sender(&self) -> Sender<TimelineCommand> {
        self.queue.sender()
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    // Read access

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    pub fn options(&self) -> &TimelineOptions {
        &self.options
    }

    pub fn scroll(&self) -> &ScrollCoordinator {
        &self.scroll
    }

    pub fn renderer(&self) -> &GridRenderer {
        &self.renderer
    }

    pub fn snap_enabled(&self) -> bool {
        self.selection.snap_enabled()
    }

    pub fn follow_playhead(&self) -> bool {
        self.follow_playhead
    }

    /// Beat the playhead is drawn at, once a frame has begun.
    pub fn displayed_playhead(&self) -> Option<f64> {
        self.playhead.displayed_beat()
    }

    pub fn active_interaction(&mut self, now: f64) -> Option<InteractionKind> {
        self.arbiter.active(now)
    }

    pub fn dragged_clip(&self) -> Option<ClipId> {
        self.clip_drag.map(|drag| drag.clip_id)
    }

    /// Full scrollable size of the content pane.
    pub fn content_size(&self, tracks: &[Track]) -> Vec2 {
        Vec2::new(self.state.content_width() as f32, tracks_height(tracks))
    }

    /// True when anything changed that needs another paint.
    pub fn needs_repaint(&mut self) -> bool {
        let dirty = self.state.take_dirty();
        let scrubbing = self.playhead.is_animating(self.playhead_target);
        dirty
            || scrubbing
            || self.state.is_scrolling()
            || self.scroll.has_pending()
            || !self.gestures.is_empty()
    }

    // Commands

    pub fn execute_command(&mut self, command: TimelineCommand) {
        log::trace!("Executing {:?}", command);
        match command {
            TimelineCommand::SetZoom { level } => {
                self.zoom_to(level, Some(0.0));
            }
            TimelineCommand::ZoomIn { anchor_x } => {
                self.zoom_to(self.state.zoom_level() as i32 - 1, anchor_x);
            }
            TimelineCommand::ZoomOut { anchor_x } => {
                self.zoom_to(self.state.zoom_level() as i32 + 1, anchor_x);
            }
            TimelineCommand::ExtendTimeline { bars } => {
                if bars > 0 {
                    self.state.extend_timeline(bars);
                    self.emit_event(TimelineEvent::TimelineExtended {
                        total_bars: self.state.total_bars(),
                    });
                }
            }
            // Commands carry no track list, so a programmatic start does not
            // check for clips under `beat`.
            TimelineCommand::StartSelection { track_id, beat } => {
                let now = self.now();
                let outcome = self
                    .selection
                    .begin(&mut self.state, &mut self.arbiter, track_id, beat, now);
                self.handle_selection_outcome(outcome);
            }
            TimelineCommand::UpdateSelection { beat } => {
                let outcome = self.selection.pointer_move(&mut self.state, beat);
                self.handle_selection_outcome(outcome);
            }
            TimelineCommand::EndSelection => {
                let outcome = self.selection.pointer_up(&mut self.state, &mut self.arbiter, None);
                self.handle_selection_outcome(outcome);
            }
            TimelineCommand::ClearSelection => {
                let outcome = self.selection.clear(&mut self.state, &mut self.arbiter);
                self.handle_selection_outcome(outcome);
            }
            TimelineCommand::SetScrollOffset { x, y } => {
                self.scroll
                    .defer(ScrollOffset::new(x, y), ScrollSource::Command);
            }
            TimelineCommand::SetSnap { enabled } => {
                self.selection.set_snap_enabled(enabled);
            }
            TimelineCommand::SetFollowPlayhead { enabled } => {
                self.follow_playhead = enabled;
            }
        }
    }

    fn now(&self) -> f64 {
        self.last_frame.unwrap_or(0.0)
    }

    fn zoom_to(&mut self, level: i32, anchor_x: Option<f64>) {
        let old_ppb = self.state.effective_pixels_per_beat();
        if !self.state.set_zoom(level) {
            return;
        }
        let new_ppb = self.state.effective_pixels_per_beat();
        let offset = self.state.scroll_offset();
        let anchor_x = anchor_x.unwrap_or(self.scroll.viewport().x as f64 / 2.0);
        let x = ScrollCoordinator::anchored_zoom_x(offset.x, anchor_x, old_ppb, new_ppb);
        self.scroll
            .defer(ScrollOffset::new(x, offset.y), ScrollSource::Command);
        self.emit_event(TimelineEvent::ZoomChanged {
            level: self.state.zoom_level(),
            division: self.state.grid_division(),
            pixels_per_beat: new_ppb,
        });
    }

    // Frame

    /// Apply everything that was deferred to this frame.
    pub fn begin_frame(&mut self, now: f64, viewport: Vec2, transport: &dyn Transport, tracks: &[Track]) {
        let dt = self.last_frame.map(|last| now - last).unwrap_or(0.0);
        self.last_frame = Some(now);

        for command in self.queue.drain() {
            self.execute_command(command);
        }

        self.state.set_beats_per_bar(transport.time_signature_beats());
        for gesture in std::mem::take(&mut self.gestures) {
            self.apply_gesture(gesture, tracks);
        }
        self.grow_to_fit(transport, tracks);

        self.scroll.set_viewport(viewport);
        let content = self.content_size(tracks);
        self.scroll.set_content_size(content);

        let current_beat = sanitize_beat(transport.current_beat());
        if self.follow_playhead && transport.is_playing() {
            let x = playhead::absolute_position(current_beat, self.state.effective_pixels_per_beat());
            let offset = self.state.scroll_offset();
            if let Some(scroll_x) = playhead::follow_scroll(x, offset.x, viewport.x as f64) {
                self.scroll
                    .defer(ScrollOffset::new(scroll_x, offset.y), ScrollSource::Command);
            }
        }
        self.scroll.commit(&mut self.state, now);

        self.playhead_target = current_beat;
        self.playhead.update(current_beat, transport.is_playing(), dt);
    }

    fn grow_to_fit(&mut self, transport: &dyn Transport, tracks: &[Track]) {
        let clip_end = tracks
            .iter()
            .map(Track::content_end_beat)
            .fold(0.0, f64::max);
        // Clip ends are exclusive: a clip ending on a bar line does not need the next bar.
        let mut added = self.state.extend_to_cover((clip_end - 1e-6).max(0.0));
        added += self.state.extend_to_cover(transport.current_beat());
        if added > 0 {
            self.emit_event(TimelineEvent::TimelineExtended {
                total_bars: self.state.total_bars(),
            });
        }
    }

    /// Offset measured from the content pane's layout this frame.
    pub fn report_pane_offset(&mut self, x: f64, y: f64) {
        self.scroll.defer(ScrollOffset::new(x, y), ScrollSource::Pane);
    }

    /// Offset the content pane has to adopt before laying out, if any.
    pub fn take_pane_sync(&mut self) -> Option<ScrollOffset> {
        self.scroll.take_pane_sync()
    }

    // Pointer gestures, in beat space

    /// Record a gesture to apply at the start of the next frame.
    pub fn push_gesture(&mut self, gesture: Gesture) {
        self.gestures.push(gesture);
    }

    fn apply_gesture(&mut self, gesture: Gesture, tracks: &[Track]) {
        match gesture {
            Gesture::Pressed { button, track_id, beat, time } => {
                self.pointer_pressed(button, track_id, beat, tracks, time)
            }
            Gesture::Dragged { beat } => self.pointer_dragged(beat),
            Gesture::Released { beat } => self.pointer_released(beat),
            Gesture::Cancelled => self.cancel_interaction(),
            Gesture::MenuClosed => self.context_menu_closed(),
        }
    }

    pub fn pointer_pressed(
        &mut self,
        button: PointerButton,
        track_id: Option<TrackId>,
        raw_beat: f64,
        tracks: &[Track],
        now: f64,
    ) {
        let beat = sanitize_beat(raw_beat);
        let clip = track_id.and_then(|track_id| tracks.clip_at(track_id, beat));
        match classify_press(button, clip.is_some()) {
            Some(InteractionKind::ClipDrag) => {
                let (Some(track_id), Some(clip)) = (track_id, clip) else {
                    return;
                };
                if !self.arbiter.start(InteractionKind::ClipDrag, now) {
                    return;
                }
                // The release of an earlier drag was lost: drop that clip where it is.
                if let Some(previous) = self.clip_drag.take() {
                    self.emit_event(TimelineEvent::ClipDragEnded {
                        clip_id: previous.clip_id,
                        track_id: previous.track_id,
                        new_start: previous.new_start,
                    });
                }
                log::debug!("Dragging clip {:?} on track {:?}", clip.id, track_id);
                self.clip_drag = Some(ClipDrag {
                    clip_id: clip.id,
                    track_id,
                    grab_beat: beat,
                    origin_start: clip.start_beat,
                    new_start: clip.start_beat,
                });
                self.emit_event(TimelineEvent::ClipDragStarted {
                    clip_id: clip.id,
                    track_id,
                });
            }
            Some(InteractionKind::SelectionDrag) => {
                let Some(track_id) = track_id else {
                    return;
                };
                let outcome = self.selection.pointer_down(
                    &mut self.state,
                    &mut self.arbiter,
                    tracks,
                    track_id,
                    beat,
                    now,
                );
                self.handle_selection_outcome(outcome);
            }
            Some(InteractionKind::RightClickMenu) => {
                if self.arbiter.start(InteractionKind::RightClickMenu, now) {
                    self.emit_event(TimelineEvent::ContextMenuOpened { track_id, beat });
                }
            }
            None => {}
        }
    }

    pub fn pointer_dragged(&mut self, raw_beat: f64) {
        if let Some(mut drag) = self.clip_drag {
            let raw_start = sanitize_beat(drag.origin_start + (raw_beat - drag.grab_beat));
            let new_start = if self.selection.snap_enabled() {
                snap(raw_start, self.state.grid_division(), self.state.beats_per_bar())
            } else {
                raw_start
            };
            if new_start != drag.new_start {
                drag.new_start = new_start;
                self.clip_drag = Some(drag);
                self.emit_event(TimelineEvent::ClipDragged {
                    clip_id: drag.clip_id,
                    track_id: drag.track_id,
                    new_start,
                });
            }
            return;
        }
        let outcome = self.selection.pointer_move(&mut self.state, raw_beat);
        self.handle_selection_outcome(outcome);
    }

    pub fn pointer_released(&mut self, raw_beat: Option<f64>) {
        if let Some(drag) = self.clip_drag.take() {
            self.arbiter.end(InteractionKind::ClipDrag);
            log::debug!("Clip {:?} dropped at beat {:.3}", drag.clip_id, drag.new_start);
            self.emit_event(TimelineEvent::ClipDragEnded {
                clip_id: drag.clip_id,
                track_id: drag.track_id,
                new_start: drag.new_start,
            });
            return;
        }
        let outcome = self.selection.pointer_up(&mut self.state, &mut self.arbiter, raw_beat);
        self.handle_selection_outcome(outcome);
    }

    /// Relocate the playhead from a click on the ruler.
    pub fn seek(&mut self, raw_beat: f64) {
        let beat = if self.selection.snap_enabled() {
            snap(raw_beat, self.state.grid_division(), self.state.beats_per_bar())
        } else {
            sanitize_beat(raw_beat)
        };
        self.emit_event(TimelineEvent::PlayheadMoved { beat });
    }

    /// Abort whatever drag is in progress (Escape, pointer lost).
    pub fn cancel_interaction(&mut self) {
        if let Some(drag) = self.clip_drag.take() {
            self.arbiter.end(InteractionKind::ClipDrag);
            // Put the clip back where it was.
            self.emit_event(TimelineEvent::ClipDragEnded {
                clip_id: drag.clip_id,
                track_id: drag.track_id,
                new_start: drag.origin_start,
            });
        }
        let outcome = self.selection.cancel(&mut self.state, &mut self.arbiter);
        self.handle_selection_outcome(outcome);
    }

    /// Release the right-click session once its menu closed.
    pub fn context_menu_closed(&mut self) {
        self.arbiter.end(InteractionKind::RightClickMenu);
    }

    fn emit_selection_changed(&mut self) {
        self.emit_event(TimelineEvent::SelectionChanged {
            selection: self.state.selection_snapshot(),
        });
    }

    fn handle_selection_outcome(&mut self, outcome: SelectionOutcome) {
        match outcome {
            SelectionOutcome::Started { .. }
            | SelectionOutcome::Committed { .. }
            | SelectionOutcome::Cleared => self.emit_selection_changed(),
            SelectionOutcome::Clicked { beat } => {
                self.emit_selection_changed();
                self.emit_event(TimelineEvent::PlayheadMoved { beat });
            }
            SelectionOutcome::Ignored | SelectionOutcome::Denied | SelectionOutcome::Updated { .. } => {}
        }
    }

    // Drawing

    /// Draw commands for `visible`, in absolute content coordinates.
    pub fn draw(&mut self, visible: Rect, tracks: &[Track]) -> Vec<DrawCommand> {
        let playhead = self.playhead.displayed_beat();
        self.renderer.draw(visible, &self.state, tracks, playhead)
    }

    /// Bar and beat lines for the ruler, which has no bands or selection.
    pub fn ruler_lines(&mut self, visible: Rect) -> Vec<(f32, LineKind)> {
        self.renderer
            .grid(visible, &self.state)
            .into_iter()
            .filter_map(|command| match command {
                DrawCommand::Line { x, kind } => Some((x, kind)),
                _ => None,
            })
            .collect()
    }

    pub fn invalidate_tiles(&mut self) {
        self.renderer.tiles_mut().invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::TransportSnapshot;
    use crate::structure::{Clip, TrackKind};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn tracks() -> Vec<Track> {
        let mut drums = Track::new("Drums", TrackKind::Audio);
        drums.clips.push(Clip::new(4.0, 8.0, "Beat"));
        vec![drums, Track::new("Keys", TrackKind::Midi)]
    }

    fn frame(engine: &mut TimelineEngine, now: f64, tracks: &[Track]) {
        engine.begin_frame(now, Vec2::new(800.0, 300.0), &TransportSnapshot::default(), tracks);
    }

    #[test]
    fn queued_commands_apply_on_next_frame() {
        let mut engine = TimelineEngine::default();
        let tracks = tracks();
        engine.command_sender().send(TimelineCommand::SetZoom { level: 1 }).unwrap();
        assert_eq!(engine.state().zoom_level(), 3);
        frame(&mut engine, 0.0, &tracks);
        assert_eq!(engine.state().zoom_level(), 1);
        assert!(matches!(
            engine.take_events().as_slice(),
            [TimelineEvent::ZoomChanged { level: 1, .. }]
        ));
    }

    #[test]
    fn click_relocates_the_playhead() {
        let mut engine = TimelineEngine::default();
        let tracks = tracks();
        frame(&mut engine, 0.0, &tracks);
        // Zoom 3 snaps to half bars.
        engine.pointer_pressed(PointerButton::Primary, Some(tracks[1].id), 5.1, &tracks, 0.0);
        engine.pointer_released(None);
        let events = engine.take_events();
        assert_eq!(events.last(), Some(&TimelineEvent::PlayheadMoved { beat: 6.0 }));
        assert!(!engine.state().selection_snapshot().active);
    }

    #[test]
    fn drag_over_empty_space_selects() {
        let mut engine = TimelineEngine::default();
        let tracks = tracks();
        frame(&mut engine, 0.0, &tracks);
        engine.pointer_pressed(PointerButton::Primary, Some(tracks[1].id), 0.0, &tracks, 0.0);
        engine.pointer_dragged(3.0);
        engine.pointer_released(Some(7.9));
        let snapshot = engine.state().selection_snapshot();
        assert!(snapshot.active);
        assert_eq!(snapshot.range, Some((0.0, 8.0)));
        assert_eq!(snapshot.track_id, Some(tracks[1].id));
    }

    #[test]
    fn clip_drag_is_reported_and_blocks_selection() {
        let mut engine = TimelineEngine::default();
        let tracks = tracks();
        frame(&mut engine, 0.0, &tracks);
        let clip_id = tracks[0].clips[0].id;

        engine.pointer_pressed(PointerButton::Primary, Some(tracks[0].id), 5.0, &tracks, 0.0);
        assert_eq!(engine.dragged_clip(), Some(clip_id));
        engine.pointer_dragged(9.2);
        // A programmatic selection cannot start during the drag.
        engine.execute_command(TimelineCommand::StartSelection {
            track_id: tracks[1].id,
            beat: 1.0,
        });
        assert!(!engine.state().selection().is_selecting());
        engine.pointer_released(Some(9.2));

        let events = engine.take_events();
        assert_eq!(
            events,
            vec![
                TimelineEvent::ClipDragStarted { clip_id, track_id: tracks[0].id },
                TimelineEvent::ClipDragged { clip_id, track_id: tracks[0].id, new_start: 8.0 },
                TimelineEvent::ClipDragEnded { clip_id, track_id: tracks[0].id, new_start: 8.0 },
            ]
        );
        assert_eq!(engine.active_interaction(0.0), None);
    }

    #[test]
    fn right_click_opens_menu_and_times_out() {
        let mut engine = TimelineEngine::default();
        let tracks = tracks();
        frame(&mut engine, 1.0, &tracks);
        engine.pointer_pressed(PointerButton::Secondary, Some(tracks[1].id), 3.0, &tracks, 1.0);
        assert_eq!(
            engine.take_events(),
            vec![TimelineEvent::ContextMenuOpened { track_id: Some(tracks[1].id), beat: 3.0 }]
        );
        engine.pointer_pressed(PointerButton::Primary, Some(tracks[1].id), 3.0, &tracks, 1.1);
        assert!(!engine.state().selection().is_selecting());
        engine.pointer_pressed(PointerButton::Primary, Some(tracks[1].id), 3.0, &tracks, 1.3);
        assert!(engine.state().selection().is_selecting());
    }

    #[test]
    fn timeline_grows_to_cover_clips_and_playhead() {
        let mut engine = TimelineEngine::default();
        let mut tracks = tracks();
        // Ends exactly on the last bar line.
        tracks[1].clips.push(Clip::new(250.0, 6.0, "Outro"));
        frame(&mut engine, 0.0, &tracks);
        assert_eq!(engine.state().total_bars(), 64);

        tracks[1].clips.push(Clip::new(300.0, 4.0, "Tag"));
        frame(&mut engine, 0.1, &tracks);
        assert_eq!(engine.state().total_bars(), 76);

        let transport = TransportSnapshot { current_beat: 400.0, ..Default::default() };
        engine.begin_frame(0.2, Vec2::new(800.0, 300.0), &transport, &tracks);
        assert_eq!(engine.state().total_bars(), 101);
        let extended = engine
            .take_events()
            .into_iter()
            .filter(|event| matches!(event, TimelineEvent::TimelineExtended { .. }))
            .count();
        assert_eq!(extended, 2);
    }

    #[test]
    fn zoom_in_keeps_anchor() {
        let mut engine = TimelineEngine::default();
        let tracks = tracks();
        frame(&mut engine, 0.0, &tracks);
        engine.execute_command(TimelineCommand::SetScrollOffset { x: 400.0, y: 0.0 });
        frame(&mut engine, 0.1, &tracks);
        assert_eq!(engine.state().scroll_offset().x, 400.0);

        // 40 px/beat: beat 15 under x 200.
        engine.execute_command(TimelineCommand::ZoomIn { anchor_x: Some(200.0) });
        frame(&mut engine, 0.2, &tracks);
        assert_eq!(engine.state().effective_pixels_per_beat(), 80.0);
        assert_eq!(engine.state().scroll_offset().x, 1_000.0);
    }

    #[test]
    fn follow_mode_pages_while_playing() {
        let mut engine = TimelineEngine::default();
        let tracks = tracks();
        let viewport = Vec2::new(800.0, 300.0);
        let transport = TransportSnapshot { current_beat: 16.0, is_playing: true, beats_per_bar: 4 };
        // 16 beats at 40 px/beat is past three quarters of the viewport.
        engine.begin_frame(0.0, viewport, &transport, &tracks);
        assert_eq!(engine.state().scroll_offset().x, 440.0);

        engine.execute_command(TimelineCommand::SetFollowPlayhead { enabled: false });
        let transport = TransportSnapshot { current_beat: 40.0, ..transport };
        engine.begin_frame(0.1, viewport, &transport, &tracks);
        assert_eq!(engine.state().scroll_offset().x, 440.0);
    }

    #[test]
    fn listener_sees_every_event() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut engine = TimelineEngine::default();
        engine.set_event_listener(Box::new(move |event: &TimelineEvent| sink.borrow_mut().push(event.clone())));
        engine.execute_command(TimelineCommand::ExtendTimeline { bars: 16 });
        engine.execute_command(TimelineCommand::ExtendTimeline { bars: 0 });
        assert_eq!(
            seen.borrow().as_slice(),
            &[TimelineEvent::TimelineExtended { total_bars: 80 }]
        );
        assert_eq!(engine.take_events().len(), 1);
    }

    #[test]
    fn seek_snaps_unless_disabled() {
        let mut engine = TimelineEngine::default();
        engine.seek(3.4);
        engine.execute_command(TimelineCommand::SetSnap { enabled: false });
        engine.seek(3.4);
        engine.seek(f64::NAN);
        assert_eq!(
            engine.take_events(),
            vec![
                TimelineEvent::PlayheadMoved { beat: 4.0 },
                TimelineEvent::PlayheadMoved { beat: 3.4 },
                TimelineEvent::PlayheadMoved { beat: 0.0 },
            ]
        );
    }

    #[test]
    fn selection_commands_snap_like_the_pointer() {
        let mut engine = TimelineEngine::default();
        let tracks = tracks();
        let track_id = tracks[1].id;
        frame(&mut engine, 0.0, &tracks);

        // Zoom 3 snaps to half bars.
        engine.execute_command(TimelineCommand::StartSelection { track_id, beat: 5.1 });
        engine.execute_command(TimelineCommand::UpdateSelection { beat: 7.3 });
        engine.execute_command(TimelineCommand::EndSelection);
        assert_eq!(engine.state().normalized_selection_range(), Some((6.0, 8.0)));
        assert_eq!(engine.active_interaction(0.0), None);

        engine.take_events();
        engine.execute_command(TimelineCommand::StartSelection { track_id, beat: 4.0 });
        engine.execute_command(TimelineCommand::EndSelection);
        assert!(!engine.state().selection_snapshot().active);
        assert_eq!(
            engine.take_events().last(),
            Some(&TimelineEvent::PlayheadMoved { beat: 4.0 })
        );
    }

    #[test]
    fn gestures_wait_for_the_next_frame() {
        let mut engine = TimelineEngine::default();
        let tracks = tracks();
        let track_id = tracks[1].id;
        frame(&mut engine, 0.0, &tracks);

        engine.push_gesture(Gesture::Pressed {
            button: PointerButton::Primary,
            track_id: Some(track_id),
            beat: 0.0,
            time: 0.0,
        });
        engine.push_gesture(Gesture::Dragged { beat: 4.0 });
        assert!(!engine.state().selection().is_selecting());
        assert!(engine.needs_repaint());

        frame(&mut engine, 0.1, &tracks);
        assert_eq!(engine.state().selection().visible_range(), Some((track_id, (0.0, 4.0))));

        engine.push_gesture(Gesture::Released { beat: Some(4.0) });
        frame(&mut engine, 0.2, &tracks);
        assert_eq!(engine.state().normalized_selection_range(), Some((0.0, 4.0)));

        engine.push_gesture(Gesture::Pressed {
            button: PointerButton::Secondary,
            track_id: None,
            beat: 1.0,
            time: 0.3,
        });
        engine.push_gesture(Gesture::MenuClosed);
        frame(&mut engine, 0.3, &tracks);
        assert_eq!(engine.active_interaction(0.3), None);
    }

    #[test]
    fn second_clip_press_ends_the_first_drag() {
        let mut engine = TimelineEngine::default();
        let mut tracks = tracks();
        tracks[1].clips.push(Clip::new(16.0, 4.0, "Pad"));
        frame(&mut engine, 0.0, &tracks);
        let first = tracks[0].clips[0].id;
        let second = tracks[1].clips[0].id;

        engine.pointer_pressed(PointerButton::Primary, Some(tracks[0].id), 5.0, &tracks, 0.0);
        engine.pointer_dragged(9.2);
        engine.pointer_pressed(PointerButton::Primary, Some(tracks[1].id), 17.0, &tracks, 0.1);
        assert_eq!(engine.dragged_clip(), Some(second));

        let events = engine.take_events();
        assert_eq!(
            &events[2..],
            &[
                TimelineEvent::ClipDragEnded { clip_id: first, track_id: tracks[0].id, new_start: 8.0 },
                TimelineEvent::ClipDragStarted { clip_id: second, track_id: tracks[1].id },
            ]
        );
    }

    #[test]
    fn cancel_restores_dragged_clip() {
        let mut engine = TimelineEngine::default();
        let tracks = tracks();
        frame(&mut engine, 0.0, &tracks);
        engine.pointer_pressed(PointerButton::Primary, Some(tracks[0].id), 6.0, &tracks, 0.0);
        engine.pointer_dragged(14.0);
        engine.cancel_interaction();
        let events = engine.take_events();
        assert!(matches!(
            events.last(),
            Some(TimelineEvent::ClipDragEnded { new_start, .. }) if *new_start == 4.0
        ));
        assert_eq!(engine.active_interaction(0.0), None);
    }
}
