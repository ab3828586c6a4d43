use crate::structure::{Track, TrackKind};
use egui::*;

fn kind_label(kind: TrackKind) -> &'static str {
    match kind {
        TrackKind::Audio => "Audio",
        TrackKind::Midi => "MIDI",
        TrackKind::Instrument => "Instrument",
        TrackKind::Master => "Master",
    }
}

/// Header cell for one track in the sidebar.
pub struct TrackHeader<'a> {
    track: &'a Track,
    selected: bool,
}

impl<'a> TrackHeader<'a> {
    pub fn new(track: &'a Track) -> Self {
        Self {
            track,
            selected: false,
        }
    }

    /// Highlight the header of the track that holds the selection.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn paint(&self, painter: &Painter, rect: Rect) {
        let background = if self.selected {
            Color32::from_gray(55)
        } else {
            Color32::from_gray(45)
        };
        painter.rect_filled(rect, 0.0, background);

        let strip = Rect::from_min_size(rect.min, Vec2::new(4.0, rect.height()));
        painter.rect_filled(strip, 0.0, self.track.color);

        painter.text(
            rect.min + Vec2::new(12.0, 8.0),
            Align2::LEFT_TOP,
            &self.track.name,
            FontId::proportional(14.0),
            Color32::WHITE,
        );
        painter.text(
            rect.min + Vec2::new(12.0, 28.0),
            Align2::LEFT_TOP,
            kind_label(self.track.kind),
            FontId::proportional(11.0),
            Color32::from_gray(150),
        );

        painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            Stroke::new(1.0, Color32::from_gray(25)),
        );
    }
}
