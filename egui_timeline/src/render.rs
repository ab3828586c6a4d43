//! Grid rendering
//!
//! Turns the timeline state into a flat list of [`DrawCommand`]s for the part
//! of the canvas that is on screen. The logical canvas can be tens of
//! thousands of pixels wide, so it is cut into fixed-width tiles whose
//! commands are cached; scrolling only builds the tiles that become exposed.
//!
//! All x coordinates are absolute content coordinates. Hosts translate them by
//! the scroll offset when painting.

use crate::grid::{GridResolution, LineKind};
use crate::structure::{track_index, track_top, Track, TimelineState};
use egui::Rect;
use std::collections::BTreeMap;
use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    /// Tinted alternating band spanning the full pane height.
    Band { min_x: f32, max_x: f32 },
    /// Vertical grid line spanning the full pane height.
    Line { x: f32, kind: LineKind },
    /// Selection highlight on one track.
    Selection { rect: Rect },
    Playhead { x: f32 },
}

impl DrawCommand {
    fn min_x(&self) -> f32 {
        match self {
            DrawCommand::Band { min_x, .. } => *min_x,
            DrawCommand::Line { x, .. } | DrawCommand::Playhead { x } => *x,
            DrawCommand::Selection { rect } => rect.min.x,
        }
    }

    fn max_x(&self) -> f32 {
        match self {
            DrawCommand::Band { max_x, .. } => *max_x,
            DrawCommand::Line { x, .. } | DrawCommand::Playhead { x } => *x,
            DrawCommand::Selection { rect } => rect.max.x,
        }
    }

    pub fn intersects_x(&self, range: &Range<f32>) -> bool {
        self.max_x() >= range.start && self.min_x() <= range.end
    }
}

fn is_multiple(value: f64, step: f64) -> bool {
    let ratio = value / step;
    (ratio - ratio.round()).abs() < 1e-6
}

/// Grid lines with beat positions in `[start_beat, end_beat)`, coarse kinds
/// first. A position is emitted once, with its heaviest kind.
pub fn grid_lines(
    resolution: &GridResolution,
    beats_per_bar: u32,
    pixels_per_beat: f64,
    start_beat: f64,
    end_beat: f64,
    out: &mut Vec<DrawCommand>,
) {
    let bar = LineKind::Bar.spacing_beats(beats_per_bar);
    for kind in resolution.visible_subdivisions() {
        let spacing = match kind {
            LineKind::Bar => bar * resolution.bar_stride.max(1) as f64,
            _ => kind.spacing_beats(beats_per_bar),
        };
        let coarser: Vec<f64> = resolution
            .visible_subdivisions()
            .take_while(|coarse| *coarse < kind)
            .map(|coarse| coarse.spacing_beats(beats_per_bar))
            .collect();
        let mut index = (start_beat / spacing).ceil().max(0.0) as u64;
        loop {
            let beat = index as f64 * spacing;
            if beat >= end_beat {
                break;
            }
            index += 1;
            if coarser.iter().any(|step| is_multiple(beat, *step)) {
                continue;
            }
            out.push(DrawCommand::Line {
                x: (beat * pixels_per_beat) as f32,
                kind,
            });
        }
    }
}

/// Alternating bands over `[start_beat, end_beat)`: groups of
/// `alternating_interval` bars, every odd group tinted.
pub fn alternating_bands(
    alternating_interval: u32,
    beats_per_bar: u32,
    pixels_per_beat: f64,
    start_beat: f64,
    end_beat: f64,
    out: &mut Vec<DrawCommand>,
) {
    let group_beats = alternating_interval.max(1) as f64 * beats_per_bar.max(1) as f64;
    let mut group = (start_beat / group_beats).floor().max(0.0) as u64;
    loop {
        let group_start = group as f64 * group_beats;
        if group_start >= end_beat {
            break;
        }
        if group % 2 == 1 {
            let min_beat = group_start.max(start_beat);
            let max_beat = (group_start + group_beats).min(end_beat);
            out.push(DrawCommand::Band {
                min_x: (min_beat * pixels_per_beat) as f32,
                max_x: (max_beat * pixels_per_beat) as f32,
            });
        }
        group += 1;
    }
}

/// Everything a cached tile depends on besides its position and the
/// timeline end. Only the tiles around the end depend on the latter.
#[derive(Clone, Copy, Debug, PartialEq)]
struct TileKey {
    resolution: GridResolution,
    beats_per_bar: u32,
    pixels_per_beat: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileStats {
    /// Tiles built during the last pass.
    pub built: usize,
    /// Tiles reused from the cache during the last pass.
    pub reused: usize,
    pub cached: usize,
}

/// Cache of per-tile draw commands over an arbitrarily wide canvas.
#[derive(Clone, Debug)]
pub struct TileCache {
    tile_width: f64,
    key: Option<TileKey>,
    total_beats: Option<f64>,
    tiles: BTreeMap<u64, Vec<DrawCommand>>,
    stats: TileStats,
}

impl TileCache {
    pub fn new(tile_width: f64) -> Self {
        Self {
            tile_width: if tile_width > 0.0 { tile_width } else { 1024.0 },
            key: None,
            total_beats: None,
            tiles: BTreeMap::new(),
            stats: TileStats::default(),
        }
    }

    pub fn tile_width(&self) -> f64 {
        self.tile_width
    }

    pub fn stats(&self) -> TileStats {
        self.stats
    }

    pub fn invalidate_all(&mut self) {
        self.tiles.clear();
        self.key = None;
        self.total_beats = None;
    }

    /// Drop the tiles overlapping `[min_x, max_x]`.
    pub fn invalidate_range(&mut self, min_x: f64, max_x: f64) {
        let tiles = self.tile_range(min_x, max_x);
        self.tiles.retain(|index, _| !tiles.contains(index));
    }

    pub fn tile_range(&self, min_x: f64, max_x: f64) -> Range<u64> {
        let first = (min_x.max(0.0) / self.tile_width).floor() as u64;
        let last = (max_x.max(0.0) / self.tile_width).floor() as u64;
        first..last + 1
    }

    fn build_tile(&self, index: u64, key: &TileKey, total_beats: f64) -> Vec<DrawCommand> {
        let tile_min_x = index as f64 * self.tile_width;
        let start_beat = tile_min_x / key.pixels_per_beat;
        let end_beat = ((tile_min_x + self.tile_width) / key.pixels_per_beat).min(total_beats);
        let mut commands = Vec::new();
        if start_beat >= total_beats {
            return commands;
        }
        alternating_bands(
            key.resolution.alternating_interval,
            key.beats_per_bar,
            key.pixels_per_beat,
            start_beat,
            end_beat,
            &mut commands,
        );
        grid_lines(
            &key.resolution,
            key.beats_per_bar,
            key.pixels_per_beat,
            start_beat,
            end_beat,
            &mut commands,
        );
        // Closing line at the very end of the timeline.
        if end_beat >= total_beats && total_beats > start_beat {
            commands.push(DrawCommand::Line {
                x: (total_beats * key.pixels_per_beat) as f32,
                kind: LineKind::Bar,
            });
        }
        commands
    }

    /// Drop the tiles between two positions of the timeline end, including
    /// the tile whose right edge touches the lower one.
    fn invalidate_end(&mut self, min_x: f64, max_x: f64) {
        let first = ((min_x / self.tile_width).ceil() as u64).saturating_sub(1);
        let last = (max_x / self.tile_width).floor() as u64;
        self.tiles.retain(|index, _| *index < first || *index > last);
    }

    /// Make sure every tile overlapping `[min_x, max_x]` is built and evict
    /// tiles that are far away.
    fn prepare(&mut self, key: TileKey, total_beats: f64, min_x: f64, max_x: f64) -> Range<u64> {
        if self.key != Some(key) {
            if self.key.is_some() {
                log::trace!("Grid parameters changed, dropping {} tiles", self.tiles.len());
            }
            self.tiles.clear();
            self.key = Some(key);
        } else if let Some(old_total) = self.total_beats.filter(|old| *old != total_beats) {
            self.invalidate_end(
                old_total.min(total_beats) * key.pixels_per_beat,
                old_total.max(total_beats) * key.pixels_per_beat,
            );
        }
        self.total_beats = Some(total_beats);

        let range = self.tile_range(min_x, max_x);
        let mut stats = TileStats::default();
        for index in range.clone() {
            if self.tiles.contains_key(&index) {
                stats.reused += 1;
            } else {
                let tile = self.build_tile(index, &key, total_beats);
                self.tiles.insert(index, tile);
                stats.built += 1;
            }
        }
        let keep_from = range.start.saturating_sub(2);
        let keep_to = range.end + 2;
        self.tiles.retain(|index, _| *index >= keep_from && *index < keep_to);
        stats.cached = self.tiles.len();
        if stats.built > 0 {
            log::trace!("Built {} grid tiles ({} reused)", stats.built, stats.reused);
        }
        self.stats = stats;
        range
    }
}

/// Produces the draw commands for one pass over the visible area.
#[derive(Clone, Debug)]
pub struct GridRenderer {
    tiles: TileCache,
    margin: f64,
    fast_scroll_speed: f64,
}

impl Default for GridRenderer {
    fn default() -> Self {
        Self::new(1024.0, 100.0, 3000.0)
    }
}

impl GridRenderer {
    pub fn new(tile_width: f64, margin: f64, fast_scroll_speed: f64) -> Self {
        Self {
            tiles: TileCache::new(tile_width),
            margin: margin.max(0.0),
            fast_scroll_speed,
        }
    }

    pub fn tiles(&self) -> &TileCache {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut TileCache {
        &mut self.tiles
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Resolution to draw with, trading detail for frame time while the
    /// view scrolls fast.
    pub fn effective_resolution(&self, state: &TimelineState) -> GridResolution {
        let resolution = state.resolution();
        if state.is_scrolling() && state.scrolling_speed() > self.fast_scroll_speed {
            resolution.capped_at(LineKind::Quarter)
        } else {
            resolution
        }
    }

    /// Horizontal range that gets drawn for a visible rect.
    pub fn expanded_range(&self, visible: Rect) -> Range<f32> {
        (visible.min.x - self.margin as f32)..(visible.max.x + self.margin as f32)
    }

    /// Bands and grid lines intersecting the expanded visible rect.
    pub fn grid(&mut self, visible: Rect, state: &TimelineState) -> Vec<DrawCommand> {
        let key = TileKey {
            resolution: self.effective_resolution(state),
            beats_per_bar: state.beats_per_bar(),
            pixels_per_beat: state.effective_pixels_per_beat(),
        };
        let range = self.expanded_range(visible);
        let tiles = self
            .tiles
            .prepare(key, state.total_beats(), range.start as f64, range.end as f64);

        let mut commands = Vec::new();
        for index in tiles {
            if let Some(tile) = self.tiles.tiles.get(&index) {
                commands.extend(tile.iter().filter(|command| command.intersects_x(&range)));
            }
        }
        commands
    }

    /// Full draw callback: grid, selection highlight and playhead.
    pub fn draw(
        &mut self,
        visible: Rect,
        state: &TimelineState,
        tracks: &[Track],
        playhead_beat: Option<f64>,
    ) -> Vec<DrawCommand> {
        let mut commands = self.grid(visible, state);
        let range = self.expanded_range(visible);

        if let Some((track_id, (start, end))) = state.selection().visible_range() {
            if let Some(index) = track_index(tracks, track_id) {
                let top = track_top(tracks, index);
                let rect = Rect::from_min_max(
                    egui::pos2(state.beat_to_x(start) as f32, top),
                    egui::pos2(state.beat_to_x(end) as f32, top + tracks[index].height),
                );
                let command = DrawCommand::Selection { rect };
                if command.intersects_x(&range) {
                    commands.push(command);
                }
            }
        }

        if let Some(beat) = playhead_beat {
            let x = crate::playhead::absolute_position(beat, state.effective_pixels_per_beat());
            if crate::playhead::is_visible(x, visible.min.x as f64, visible.max.x as f64) {
                commands.push(DrawCommand::Playhead { x: x as f32 });
            }
        }
        commands
    }
}
