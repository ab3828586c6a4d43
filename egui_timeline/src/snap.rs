//! Beat snapping
//!
//! Rounds a pointer-derived beat position to the nearest grid point of a
//! division. Every function here is total: negative, NaN and infinite input
//! is treated as beat 0.

use crate::grid::GridDivision;

/// Clamp a raw beat position into the valid timeline range.
pub fn sanitize_beat(beat: f64) -> f64 {
    if beat.is_finite() && beat > 0.0 {
        beat
    } else {
        0.0
    }
}

fn round_to(beat: f64, step: f64) -> f64 {
    (beat / step).round() * step
}

/// Snap `raw_beat` to the grid of `division`.
///
/// `Half` snaps to the bar start, the bar's half-point or the next bar start,
/// splitting the bar at its first and last quarter. The result is never
/// negative and `snap(snap(x)) == snap(x)`.
pub fn snap(raw_beat: f64, division: GridDivision, beats_per_bar: u32) -> f64 {
    let beat = sanitize_beat(raw_beat);
    let bar = beats_per_bar.max(1) as f64;
    let snapped = match division {
        GridDivision::Sixteenth => round_to(beat, 0.25),
        GridDivision::Eighth => round_to(beat, 0.5),
        GridDivision::Quarter => round_to(beat, 1.0),
        GridDivision::Half => {
            let bar_index = (beat / bar).floor();
            let bar_start = bar_index * bar;
            let pos_in_bar = beat - bar_start;
            if pos_in_bar < bar / 4.0 {
                bar_start
            } else if pos_in_bar > 3.0 * bar / 4.0 {
                bar_start + bar
            } else {
                bar_start + bar / 2.0
            }
        }
        GridDivision::Bar | GridDivision::TwoBar | GridDivision::FourBar => {
            round_to(beat, division.step_beats(beats_per_bar))
        }
    };
    snapped.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_rounds_to_whole_beats() {
        assert_eq!(snap(10.3, GridDivision::Quarter, 4), 10.0);
        assert_eq!(snap(10.6, GridDivision::Quarter, 4), 11.0);
    }

    #[test]
    fn half_snaps_to_the_bar_midpoint() {
        assert_eq!(snap(1.5, GridDivision::Half, 4), 2.0);
        assert_eq!(snap(0.9, GridDivision::Half, 4), 0.0);
        assert_eq!(snap(3.2, GridDivision::Half, 4), 4.0);
        assert_eq!(snap(5.0, GridDivision::Half, 4), 6.0);
    }

    #[test]
    fn half_in_three_four() {
        assert_eq!(snap(1.4, GridDivision::Half, 3), 1.5);
        assert_eq!(snap(2.5, GridDivision::Half, 3), 3.0);
        assert_eq!(snap(0.5, GridDivision::Half, 3), 0.0);
    }

    #[test]
    fn fine_divisions() {
        assert_eq!(snap(1.13, GridDivision::Sixteenth, 4), 1.25);
        assert_eq!(snap(1.1, GridDivision::Sixteenth, 4), 1.0);
        assert_eq!(snap(2.74, GridDivision::Eighth, 4), 2.5);
    }

    #[test]
    fn bar_multiples() {
        assert_eq!(snap(5.9, GridDivision::Bar, 4), 4.0);
        assert_eq!(snap(6.1, GridDivision::Bar, 4), 8.0);
        assert_eq!(snap(11.0, GridDivision::TwoBar, 4), 8.0);
        assert_eq!(snap(13.0, GridDivision::TwoBar, 4), 16.0);
        assert_eq!(snap(23.0, GridDivision::FourBar, 4), 16.0);
        assert_eq!(snap(25.0, GridDivision::FourBar, 4), 32.0);
    }

    #[test]
    fn invalid_input_clamps_to_zero() {
        for division in GridDivision::ALL {
            assert_eq!(snap(-3.0, division, 4), 0.0);
            assert_eq!(snap(f64::NAN, division, 4), 0.0);
            assert_eq!(snap(f64::NEG_INFINITY, division, 4), 0.0);
        }
    }

    #[test]
    fn snapping_is_idempotent() {
        for beats_per_bar in [2, 3, 4, 5, 7] {
            for division in GridDivision::ALL {
                for step in 0..2000 {
                    let raw = step as f64 * 0.0371;
                    let once = snap(raw, division, beats_per_bar);
                    assert!(once >= 0.0);
                    assert_eq!(
                        snap(once, division, beats_per_bar),
                        once,
                        "{division:?} in {beats_per_bar} at {raw}"
                    );
                }
            }
        }
    }
}
