//! Grid resolution policy
//!
//! Maps a zoom level to the grid division used for snapping, the width of the
//! alternating background bands and the finest line that is still drawn.
//! The table is fixed and ordered from the finest level (0) to the coarsest.

pub const MIN_ZOOM_LEVEL: u8 = 0;
pub const MAX_ZOOM_LEVEL: u8 = 6;

/// Grid division used for snapping and as the label of the current zoom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GridDivision {
    Sixteenth,
    Eighth,
    Quarter,
    Half,
    Bar,
    TwoBar,
    FourBar,
}

impl GridDivision {
    pub const ALL: [GridDivision; 7] = [
        GridDivision::Sixteenth,
        GridDivision::Eighth,
        GridDivision::Quarter,
        GridDivision::Half,
        GridDivision::Bar,
        GridDivision::TwoBar,
        GridDivision::FourBar,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GridDivision::Sixteenth => "1/16",
            GridDivision::Eighth => "1/8",
            GridDivision::Quarter => "1/4",
            GridDivision::Half => "1/2",
            GridDivision::Bar => "1 bar",
            GridDivision::TwoBar => "2 bars",
            GridDivision::FourBar => "4 bars",
        }
    }

    /// Distance between two grid points of this division, in beats.
    pub fn step_beats(self, beats_per_bar: u32) -> f64 {
        let bar = beats_per_bar.max(1) as f64;
        match self {
            GridDivision::Sixteenth => 0.25,
            GridDivision::Eighth => 0.5,
            GridDivision::Quarter => 1.0,
            GridDivision::Half => bar / 2.0,
            GridDivision::Bar => bar,
            GridDivision::TwoBar => bar * 2.0,
            GridDivision::FourBar => bar * 4.0,
        }
    }
}

/// Kinds of vertical grid lines, ordered from heaviest to lightest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LineKind {
    Bar,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
}

impl LineKind {
    pub const ALL: [LineKind; 5] = [
        LineKind::Bar,
        LineKind::Half,
        LineKind::Quarter,
        LineKind::Eighth,
        LineKind::Sixteenth,
    ];

    /// Spacing between lines of this kind, in beats.
    pub fn spacing_beats(self, beats_per_bar: u32) -> f64 {
        let bar = beats_per_bar.max(1) as f64;
        match self {
            LineKind::Bar => bar,
            LineKind::Half => bar / 2.0,
            LineKind::Quarter => 1.0,
            LineKind::Eighth => 0.5,
            LineKind::Sixteenth => 0.25,
        }
    }
}

/// Everything the renderer and the snap engine derive from one zoom level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridResolution {
    pub zoom_level: u8,
    pub division: GridDivision,
    /// Bars per alternating background band.
    pub alternating_interval: u32,
    /// Finest line kind that is drawn at this level.
    pub finest_line: LineKind,
    /// Only every `bar_stride`-th bar line is drawn.
    pub bar_stride: u32,
    pub zoom_factor: f64,
}

impl GridResolution {
    pub fn shows(&self, kind: LineKind) -> bool {
        kind <= self.finest_line
    }

    pub fn show_eighth_notes(&self) -> bool {
        self.shows(LineKind::Eighth)
    }

    pub fn show_sixteenth_notes(&self) -> bool {
        self.shows(LineKind::Sixteenth)
    }

    pub fn visible_subdivisions(&self) -> impl Iterator<Item = LineKind> + '_ {
        LineKind::ALL.into_iter().filter(move |kind| self.shows(*kind))
    }

    /// Same resolution with every line finer than `cap` hidden.
    pub fn capped_at(mut self, cap: LineKind) -> Self {
        self.finest_line = self.finest_line.min(cap);
        self
    }
}

const RESOLUTION_TABLE: [GridResolution; 7] = [
    GridResolution {
        zoom_level: 0,
        division: GridDivision::Sixteenth,
        alternating_interval: 1,
        finest_line: LineKind::Sixteenth,
        bar_stride: 1,
        zoom_factor: 4.0,
    },
    GridResolution {
        zoom_level: 1,
        division: GridDivision::Eighth,
        alternating_interval: 1,
        finest_line: LineKind::Eighth,
        bar_stride: 1,
        zoom_factor: 2.0,
    },
    GridResolution {
        zoom_level: 2,
        division: GridDivision::Quarter,
        alternating_interval: 2,
        finest_line: LineKind::Quarter,
        bar_stride: 1,
        zoom_factor: 1.0,
    },
    GridResolution {
        zoom_level: 3,
        division: GridDivision::Half,
        alternating_interval: 4,
        finest_line: LineKind::Half,
        bar_stride: 1,
        zoom_factor: 0.5,
    },
    GridResolution {
        zoom_level: 4,
        division: GridDivision::Bar,
        alternating_interval: 4,
        finest_line: LineKind::Bar,
        bar_stride: 1,
        zoom_factor: 0.25,
    },
    GridResolution {
        zoom_level: 5,
        division: GridDivision::TwoBar,
        alternating_interval: 8,
        finest_line: LineKind::Bar,
        bar_stride: 2,
        zoom_factor: 0.125,
    },
    GridResolution {
        zoom_level: 6,
        division: GridDivision::FourBar,
        alternating_interval: 16,
        finest_line: LineKind::Bar,
        bar_stride: 4,
        zoom_factor: 0.0625,
    },
];

pub fn clamp_zoom_level(level: i32) -> u8 {
    level.clamp(MIN_ZOOM_LEVEL as i32, MAX_ZOOM_LEVEL as i32) as u8
}

/// Resolve a (possibly out of range) zoom level to its grid resolution.
pub fn resolve(zoom_level: i32) -> GridResolution {
    RESOLUTION_TABLE[clamp_zoom_level(zoom_level) as usize]
}
