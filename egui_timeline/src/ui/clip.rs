use crate::structure::{Clip, TimelineState};
use egui::*;

const CLIP_PADDING: f32 = 4.0;

/// Clip rectangle in content coordinates.
pub fn clip_rect(clip: &Clip, state: &TimelineState, track_top: f32, track_height: f32, min_width: f32) -> Rect {
    let x = state.beat_to_x(clip.start_beat) as f32;
    let width = (state.beat_to_x(clip.length_beats) as f32).max(min_width);
    let height = (track_height - 2.0 * CLIP_PADDING).max(1.0);
    Rect::from_min_size(Pos2::new(x, track_top + CLIP_PADDING), Vec2::new(width, height))
}

pub struct ClipRenderer<'a> {
    clip: &'a Clip,
    /// Screen rectangle.
    rect: Rect,
    is_dragged: bool,
}

impl<'a> ClipRenderer<'a> {
    pub fn new(clip: &'a Clip, rect: Rect) -> Self {
        Self {
            clip,
            rect,
            is_dragged: false,
        }
    }

    pub fn set_dragged(&mut self, dragged: bool) {
        self.is_dragged = dragged;
    }

    pub fn render(&self, painter: &Painter) {
        painter.rect_filled(self.rect, 4.0, self.clip.color.gamma_multiply(0.8));

        let (stroke_width, stroke_color) = if self.is_dragged {
            (3.0, Color32::from_rgb(255, 255, 100))
        } else {
            (1.5, Color32::from_gray(200))
        };
        painter.rect_stroke(self.rect, 4.0, Stroke::new(stroke_width, stroke_color));

        if self.rect.width() > 40.0 {
            painter.text(
                self.rect.left_top() + Vec2::new(4.0, 4.0),
                Align2::LEFT_TOP,
                &self.clip.name,
                FontId::proportional(11.0),
                Color32::WHITE,
            );
        }
    }

    pub fn hit_test(&self, pos: Pos2) -> bool {
        self.rect.contains(pos)
    }
}
