//! Data structures
//!
//! Tracks and clips as handed in by the host, plus [`TimelineState`], the one
//! mutable view-state object of a timeline. All positions are in beats.

use crate::grid::{self, GridDivision, GridResolution};
use crate::snap::sanitize_beat;
use egui::Color32;
use std::sync::atomic::{AtomicU64, Ordering};

static TRACK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);
static CLIP_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrackId(pub u64);

impl TrackId {
    pub fn next() -> Self {
        TrackId(TRACK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClipId(pub u64);

impl ClipId {
    pub fn next() -> Self {
        ClipId(CLIP_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Midi,
    Instrument,
    Master,
}

#[derive(Clone, Debug)]
pub struct Clip {
    pub id: ClipId,
    pub start_beat: f64,
    pub length_beats: f64,
    pub name: String,
    pub color: Color32,
}

impl Clip {
    pub fn new(start_beat: f64, length_beats: f64, name: impl Into<String>) -> Self {
        Self {
            id: ClipId::next(),
            start_beat: sanitize_beat(start_beat),
            length_beats: sanitize_beat(length_beats),
            name: name.into(),
            color: Color32::from_rgb(100, 200, 100),
        }
    }

    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.length_beats
    }

    /// Half-open occupancy test: `[start, end)`.
    pub fn contains_beat(&self, beat: f64) -> bool {
        beat >= self.start_beat && beat < self.end_beat()
    }
}

#[derive(Clone, Debug)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub kind: TrackKind,
    pub height: f32,
    pub color: Color32,
    pub clips: Vec<Clip>,
}

impl Track {
    pub fn new(name: impl Into<String>, kind: TrackKind) -> Self {
        Self {
            id: TrackId::next(),
            name: name.into(),
            kind,
            height: 80.0,
            color: match kind {
                TrackKind::Audio => Color32::from_rgb(150, 150, 250),
                TrackKind::Midi => Color32::from_rgb(100, 200, 100),
                TrackKind::Instrument => Color32::from_rgb(230, 170, 90),
                TrackKind::Master => Color32::from_gray(170),
            },
            clips: Vec::new(),
        }
    }

    pub fn clip_at(&self, beat: f64) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.contains_beat(beat))
    }

    /// Last beat covered by any clip on this track.
    pub fn content_end_beat(&self) -> f64 {
        self.clips.iter().map(Clip::end_beat).fold(0.0, f64::max)
    }
}

/// Occupancy queries used to decide whether a press belongs to clip dragging.
pub trait ClipOccupancy {
    fn clip_at(&self, track_id: TrackId, beat: f64) -> Option<&Clip>;

    fn is_beat_on_clip(&self, track_id: TrackId, beat: f64) -> bool {
        self.clip_at(track_id, beat).is_some()
    }
}

impl ClipOccupancy for [Track] {
    fn clip_at(&self, track_id: TrackId, beat: f64) -> Option<&Clip> {
        self.iter()
            .find(|track| track.id == track_id)
            .and_then(|track| track.clip_at(beat))
    }
}

/// Top edge of the track at `index`, in content coordinates.
pub fn track_top(tracks: &[Track], index: usize) -> f32 {
    tracks.iter().take(index).map(|track| track.height).sum()
}

pub fn tracks_height(tracks: &[Track]) -> f32 {
    tracks.iter().map(|track| track.height).sum()
}

/// Track under a content-space y coordinate.
pub fn track_at_y(tracks: &[Track], y: f32) -> Option<(usize, &Track)> {
    if y < 0.0 {
        return None;
    }
    let mut top = 0.0;
    for (index, track) in tracks.iter().enumerate() {
        let bottom = top + track.height;
        if y < bottom {
            return Some((index, track));
        }
        top = bottom;
    }
    None
}

pub fn track_index(tracks: &[Track], track_id: TrackId) -> Option<usize> {
    tracks.iter().position(|track| track.id == track_id)
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

impl ScrollOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Normalize two selection bounds into `(min, max)`.
pub fn normalize_range(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionPhase {
    #[default]
    Idle,
    Selecting,
    Active,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Selection {
    phase: SelectionPhase,
    start_beat: f64,
    end_beat: f64,
    track_id: Option<TrackId>,
}

impl Selection {
    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    /// A committed selection.
    pub fn is_active(&self) -> bool {
        self.phase == SelectionPhase::Active
    }

    pub fn is_selecting(&self) -> bool {
        self.phase == SelectionPhase::Selecting
    }

    pub fn track_id(&self) -> Option<TrackId> {
        self.track_id
    }

    /// Beat where the current drag started.
    pub fn anchor_beat(&self) -> f64 {
        self.start_beat
    }

    pub fn normalized_range(&self) -> (f64, f64) {
        normalize_range(self.start_beat, self.end_beat)
    }

    pub fn span(&self) -> f64 {
        (self.end_beat - self.start_beat).abs()
    }

    /// Range to draw: the live drag or the committed selection.
    pub fn visible_range(&self) -> Option<(TrackId, (f64, f64))> {
        match (self.phase, self.track_id) {
            (SelectionPhase::Idle, _) | (_, None) => None,
            (_, Some(track_id)) => Some((track_id, self.normalized_range())),
        }
    }
}

/// Read model of the selection handed to other editors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionSnapshot {
    pub active: bool,
    pub range: Option<(f64, f64)>,
    pub track_id: Option<TrackId>,
}

#[derive(Clone, Debug)]
pub struct TimelineState {
    scroll_offset: ScrollOffset,
    zoom_level: u8,
    pixels_per_beat_base: f64,
    total_bars: u32,
    beats_per_bar: u32,
    selection: Selection,
    is_scrolling: bool,
    scrolling_speed: f64,
    dirty: bool,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self::new(80.0, 3, 64)
    }
}

impl TimelineState {
    pub fn new(pixels_per_beat_base: f64, zoom_level: i32, total_bars: u32) -> Self {
        let base = if pixels_per_beat_base.is_finite() && pixels_per_beat_base > 0.0 {
            pixels_per_beat_base
        } else {
            log::warn!("Invalid base pixels per beat {}, using 80", pixels_per_beat_base);
            80.0
        };
        Self {
            scroll_offset: ScrollOffset::default(),
            zoom_level: grid::clamp_zoom_level(zoom_level),
            pixels_per_beat_base: base,
            total_bars: total_bars.max(1),
            beats_per_bar: 4,
            selection: Selection::default(),
            is_scrolling: false,
            scrolling_speed: 0.0,
            dirty: true,
        }
    }

    // Derived values

    pub fn resolution(&self) -> GridResolution {
        grid::resolve(self.zoom_level as i32)
    }

    pub fn grid_division(&self) -> GridDivision {
        self.resolution().division
    }

    pub fn alternating_interval(&self) -> u32 {
        self.resolution().alternating_interval
    }

    pub fn effective_pixels_per_beat(&self) -> f64 {
        self.pixels_per_beat_base * self.resolution().zoom_factor
    }

    pub fn total_beats(&self) -> f64 {
        self.total_bars as f64 * self.beats_per_bar as f64
    }

    pub fn content_width(&self) -> f64 {
        self.total_beats() * self.effective_pixels_per_beat()
    }

    /// Absolute content x of a beat.
    pub fn beat_to_x(&self, beat: f64) -> f64 {
        beat * self.effective_pixels_per_beat()
    }

    /// Beat under an absolute content x, clamped to the timeline start.
    pub fn x_to_beat(&self, x: f64) -> f64 {
        sanitize_beat(x / self.effective_pixels_per_beat())
    }

    pub fn bar_of_beat(&self, beat: f64) -> u32 {
        (sanitize_beat(beat) / self.beats_per_bar as f64).floor() as u32
    }

    // Plain accessors

    pub fn scroll_offset(&self) -> ScrollOffset {
        self.scroll_offset
    }

    pub fn zoom_level(&self) -> u8 {
        self.zoom_level
    }

    pub fn pixels_per_beat_base(&self) -> f64 {
        self.pixels_per_beat_base
    }

    pub fn total_bars(&self) -> u32 {
        self.total_bars
    }

    pub fn beats_per_bar(&self) -> u32 {
        self.beats_per_bar
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn normalized_selection_range(&self) -> Option<(f64, f64)> {
        self.selection
            .is_active()
            .then(|| self.selection.normalized_range())
    }

    pub fn selection_snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            active: self.selection.is_active(),
            range: self.normalized_selection_range(),
            track_id: self.selection.track_id.filter(|_| self.selection.is_active()),
        }
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn scrolling_speed(&self) -> f64 {
        self.scrolling_speed
    }

    /// Returns whether anything changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    // Named operations

    /// Returns true if the zoom level changed.
    pub fn set_zoom(&mut self, level: i32) -> bool {
        let clamped = grid::clamp_zoom_level(level);
        if clamped as i32 != level {
            log::warn!("Zoom level {} out of range, clamped to {}", level, clamped);
        }
        if clamped == self.zoom_level {
            return false;
        }
        self.zoom_level = clamped;
        self.dirty = true;
        log::debug!(
            "Zoom level {} ({}), {:.2} px/beat",
            clamped,
            self.grid_division().label(),
            self.effective_pixels_per_beat()
        );
        true
    }

    pub fn extend_timeline(&mut self, bars: u32) {
        if bars == 0 {
            return;
        }
        self.total_bars = self.total_bars.saturating_add(bars);
        self.dirty = true;
        log::debug!("Timeline extended by {} bars to {}", bars, self.total_bars);
    }

    /// Extend so that the bar containing `beat` exists. Returns the bars added.
    pub fn extend_to_cover(&mut self, beat: f64) -> u32 {
        let needed = self.bar_of_beat(beat).saturating_add(1);
        if needed <= self.total_bars {
            return 0;
        }
        let added = needed - self.total_bars;
        self.extend_timeline(added);
        added
    }

    pub fn set_scroll_offset(&mut self, x: f64, y: f64) {
        let offset = ScrollOffset::new(sanitize_beat(x), sanitize_beat(y));
        if offset != self.scroll_offset {
            self.scroll_offset = offset;
            self.dirty = true;
        }
    }

    pub fn set_beats_per_bar(&mut self, beats_per_bar: u32) {
        let beats_per_bar = beats_per_bar.max(1);
        if beats_per_bar != self.beats_per_bar {
            self.beats_per_bar = beats_per_bar;
            self.dirty = true;
        }
    }

    pub fn set_scrolling(&mut self, is_scrolling: bool, speed: f64) {
        self.is_scrolling = is_scrolling;
        self.scrolling_speed = if is_scrolling { sanitize_beat(speed) } else { 0.0 };
    }

    /// Begin a selection on `track_id`, replacing any selection elsewhere.
    pub fn start_selection(&mut self, track_id: TrackId, beat: f64) {
        if let Some(previous) = self.selection.track_id.filter(|id| *id != track_id) {
            log::debug!("Selection moved from track {:?} to {:?}", previous, track_id);
        }
        let beat = sanitize_beat(beat);
        self.selection = Selection {
            phase: SelectionPhase::Selecting,
            start_beat: beat,
            end_beat: beat,
            track_id: Some(track_id),
        };
        self.dirty = true;
    }

    /// Move the free end of an in-progress selection.
    pub fn update_selection(&mut self, beat: f64) {
        if !self.selection.is_selecting() {
            return;
        }
        self.selection.end_beat = sanitize_beat(beat);
        self.dirty = true;
    }

    /// Finish the drag. Spans below `epsilon` clear the selection; returns
    /// whether a selection is now active.
    pub fn end_selection(&mut self, epsilon: f64) -> bool {
        if !self.selection.is_selecting() {
            return self.selection.is_active();
        }
        if self.selection.span() >= epsilon {
            self.selection.phase = SelectionPhase::Active;
            self.dirty = true;
            true
        } else {
            self.clear_selection();
            false
        }
    }

    pub fn clear_selection(&mut self) {
        if self.selection != Selection::default() {
            self.selection = Selection::default();
            self.dirty = true;
        }
    }
}
