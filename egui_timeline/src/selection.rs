//! Range selection controller
//!
//! Drives the per-track selection state machine
//! (`Idle -> Selecting -> Active`) from pointer events. Presses that land on a
//! clip belong to clip dragging and are ignored here.

use crate::interaction::{InteractionArbiter, InteractionKind};
use crate::snap::{sanitize_beat, snap};
use crate::structure::{ClipOccupancy, TimelineState, TrackId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SelectionOutcome {
    /// Not ours to handle.
    Ignored,
    /// Another interaction holds the pointer.
    Denied,
    Started { track_id: TrackId, beat: f64 },
    Updated { range: (f64, f64) },
    Committed { track_id: TrackId, range: (f64, f64) },
    /// Released without dragging: relocate the playhead.
    Clicked { beat: f64 },
    Cleared,
}

#[derive(Clone, Debug)]
pub struct SelectionController {
    epsilon: f64,
    snap_enabled: bool,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(0.001, true)
    }
}

impl SelectionController {
    pub fn new(epsilon: f64, snap_enabled: bool) -> Self {
        Self {
            epsilon: epsilon.abs(),
            snap_enabled,
        }
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    fn snapped(&self, state: &TimelineState, raw_beat: f64) -> f64 {
        if self.snap_enabled {
            snap(raw_beat, state.grid_division(), state.beats_per_bar())
        } else {
            sanitize_beat(raw_beat)
        }
    }

    pub fn pointer_down<O>(
        &mut self,
        state: &mut TimelineState,
        arbiter: &mut InteractionArbiter,
        occupancy: &O,
        track_id: TrackId,
        raw_beat: f64,
        now: f64,
    ) -> SelectionOutcome
    where
        O: ClipOccupancy + ?Sized,
    {
        let beat = sanitize_beat(raw_beat);
        if occupancy.is_beat_on_clip(track_id, beat) {
            return SelectionOutcome::Ignored;
        }
        self.begin(state, arbiter, track_id, beat, now)
    }

    /// Start a selection without looking at clips, for callers that picked
    /// the start position themselves.
    pub fn begin(
        &mut self,
        state: &mut TimelineState,
        arbiter: &mut InteractionArbiter,
        track_id: TrackId,
        raw_beat: f64,
        now: f64,
    ) -> SelectionOutcome {
        let beat = sanitize_beat(raw_beat);
        if !arbiter.start(InteractionKind::SelectionDrag, now) {
            return SelectionOutcome::Denied;
        }
        let beat = self.snapped(state, beat);
        state.start_selection(track_id, beat);
        log::debug!("Selection started on track {:?} at beat {:.3}", track_id, beat);
        SelectionOutcome::Started { track_id, beat }
    }

    pub fn pointer_move(&mut self, state: &mut TimelineState, raw_beat: f64) -> SelectionOutcome {
        if !state.selection().is_selecting() {
            return SelectionOutcome::Ignored;
        }
        let beat = self.snapped(state, raw_beat);
        state.update_selection(beat);
        SelectionOutcome::Updated {
            range: state.selection().normalized_range(),
        }
    }

    /// Finish the drag, optionally moving the free end to `raw_beat` first.
    pub fn pointer_up(
        &mut self,
        state: &mut TimelineState,
        arbiter: &mut InteractionArbiter,
        raw_beat: Option<f64>,
    ) -> SelectionOutcome {
        if !state.selection().is_selecting() {
            return SelectionOutcome::Ignored;
        }
        if let Some(raw_beat) = raw_beat {
            let beat = self.snapped(state, raw_beat);
            state.update_selection(beat);
        }
        arbiter.end(InteractionKind::SelectionDrag);

        let track_id = state.selection().track_id();
        let anchor = state.selection().anchor_beat();
        match (state.end_selection(self.epsilon), track_id) {
            (true, Some(track_id)) => {
                let range = state.selection().normalized_range();
                log::debug!(
                    "Selection committed on track {:?}: {:.3}..{:.3}",
                    track_id,
                    range.0,
                    range.1
                );
                SelectionOutcome::Committed { track_id, range }
            }
            _ => SelectionOutcome::Clicked {
                beat: self.snapped(state, anchor),
            },
        }
    }

    /// Abort an in-progress drag (pointer lost, Escape).
    pub fn cancel(&mut self, state: &mut TimelineState, arbiter: &mut InteractionArbiter) -> SelectionOutcome {
        if !state.selection().is_selecting() {
            return SelectionOutcome::Ignored;
        }
        arbiter.end(InteractionKind::SelectionDrag);
        state.clear_selection();
        SelectionOutcome::Cleared
    }

    pub fn clear(&mut self, state: &mut TimelineState, arbiter: &mut InteractionArbiter) -> SelectionOutcome {
        let had_selection = state.selection().phase() != crate::structure::SelectionPhase::Idle;
        if state.selection().is_selecting() {
            arbiter.end(InteractionKind::SelectionDrag);
        }
        state.clear_selection();
        if had_selection {
            SelectionOutcome::Cleared
        } else {
            SelectionOutcome::Ignored
        }
    }
}
