//! Formatting helpers for positions shown in the ruler and status bar.

use crate::snap::sanitize_beat;

/// Format a beat position as `bar.beat.sixteenth`, all 1-based.
///
/// ```
/// use egui_timeline::utils::format_position;
///
/// assert_eq!(format_position(0.0, 4), "1.1.1");
/// assert_eq!(format_position(5.75, 4), "2.2.4");
/// ```
pub fn format_position(beat: f64, beats_per_bar: u32) -> String {
    let beats_per_bar = beats_per_bar.max(1) as u64;
    // Work in whole sixteenths to avoid drift on values like 0.9999999.
    let sixteenths = (sanitize_beat(beat) * 4.0 + 1e-6).floor() as u64;
    let beats = sixteenths / 4;
    let bar = beats / beats_per_bar + 1;
    let beat_in_bar = beats % beats_per_bar + 1;
    let sixteenth = sixteenths % 4 + 1;
    format!("{}.{}.{}", bar, beat_in_bar, sixteenth)
}

/// Format a beat range as `start - end (length)` for the selection readout.
pub fn format_range(range: (f64, f64), beats_per_bar: u32) -> String {
    format!(
        "{} - {} ({:.2} beats)",
        format_position(range.0, beats_per_bar),
        format_position(range.1, beats_per_bar),
        range.1 - range.0
    )
}

/// Format a beat position as wall-clock time `MM:SS.mmm` at `bpm`.
pub fn format_time(beat: f64, bpm: f64) -> String {
    let seconds = if bpm > 0.0 { sanitize_beat(beat) * 60.0 / bpm } else { 0.0 };
    let millis = (seconds * 1000.0).round() as u64;
    format!("{:02}:{:02}.{:03}", millis / 60_000, millis / 1000 % 60, millis % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based() {
        assert_eq!(format_position(0.0, 4), "1.1.1");
        assert_eq!(format_position(4.0, 4), "2.1.1");
        assert_eq!(format_position(3.0, 3), "2.1.1");
        assert_eq!(format_position(0.9999999, 4), "1.2.1");
        assert_eq!(format_position(-3.0, 4), "1.1.1");
    }

    #[test]
    fn range_readout() {
        assert_eq!(format_range((4.0, 6.5), 4), "2.1.1 - 2.3.3 (2.50 beats)");
    }

    #[test]
    fn time_at_tempo() {
        assert_eq!(format_time(251.0, 120.0), "02:05.500");
        assert_eq!(format_time(8.0, 0.0), "00:00.000");
    }
}
