use crate::grid::LineKind;
use crate::ui::renderer::{line_stroke, PLAYHEAD_COLOR};
use egui::*;

/// Bar ruler above the content pane. It never scrolls by itself; its content
/// is translated by `translation_x` (the negated main scroll offset).
pub struct Ruler<'a> {
    lines: &'a [(f32, LineKind)],
    translation_x: f32,
    pixels_per_beat: f64,
    beats_per_bar: u32,
    content_width: f64,
    playhead_x: Option<f32>,
}

impl<'a> Ruler<'a> {
    pub fn new(
        lines: &'a [(f32, LineKind)],
        translation_x: f64,
        pixels_per_beat: f64,
        beats_per_bar: u32,
        content_width: f64,
    ) -> Self {
        Self {
            lines,
            translation_x: translation_x as f32,
            pixels_per_beat,
            beats_per_bar: beats_per_bar.max(1),
            content_width,
            playhead_x: None,
        }
    }

    /// Playhead in content coordinates.
    pub fn set_playhead(&mut self, x: Option<f32>) {
        self.playhead_x = x;
    }

    /// One-based bar number starting at `x`. The closing line at the end of
    /// the timeline starts no bar.
    fn bar_number(&self, x: f32) -> Option<u64> {
        if x as f64 >= self.content_width - 0.5 {
            return None;
        }
        let beat = x as f64 / self.pixels_per_beat;
        Some((beat / self.beats_per_bar as f64).round() as u64 + 1)
    }

    pub fn ui(&self, ui: &mut Ui, rect: Rect) -> Response {
        let response = ui.allocate_rect(rect, Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, Color32::from_gray(40));

        let origin_x = rect.min.x + self.translation_x;
        for &(x, kind) in self.lines {
            let screen_x = origin_x + x;
            let tick_top = match kind {
                LineKind::Bar => rect.min.y,
                LineKind::Half => rect.center().y,
                _ => rect.max.y - rect.height() * 0.25,
            };
            painter.line_segment(
                [Pos2::new(screen_x, tick_top), Pos2::new(screen_x, rect.max.y)],
                line_stroke(kind),
            );
            if let Some(bar) = self.bar_number(x).filter(|_| kind == LineKind::Bar) {
                painter.text(
                    Pos2::new(screen_x + 4.0, rect.min.y + 2.0),
                    Align2::LEFT_TOP,
                    bar.to_string(),
                    FontId::proportional(12.0),
                    Color32::WHITE,
                );
            }
        }

        if let Some(x) = self.playhead_x {
            let x = origin_x + x;
            let tip = Pos2::new(x, rect.max.y);
            painter.add(Shape::convex_polygon(
                vec![
                    Pos2::new(x - 6.0, rect.max.y - 10.0),
                    Pos2::new(x + 6.0, rect.max.y - 10.0),
                    tip,
                ],
                PLAYHEAD_COLOR,
                Stroke::NONE,
            ));
        }

        painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            Stroke::new(1.0, Color32::from_gray(70)),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closing_line_has_no_bar_number() {
        // Two bars of 4 beats at 40 px per beat.
        let ruler = Ruler::new(&[], 0.0, 40.0, 4, 320.0);
        assert_eq!(ruler.bar_number(0.0), Some(1));
        assert_eq!(ruler.bar_number(160.0), Some(2));
        assert_eq!(ruler.bar_number(320.0), None);
    }
}
