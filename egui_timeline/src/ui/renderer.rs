use crate::grid::LineKind;
use crate::render::DrawCommand;
use egui::*;

pub const BAND_COLOR: Color32 = Color32::from_rgba_premultiplied(8, 8, 10, 40);
pub const PLAYHEAD_COLOR: Color32 = Color32::from_rgb(255, 100, 100);

/// Stroke for each line kind; bar lines are the brightest.
pub fn line_stroke(kind: LineKind) -> Stroke {
    match kind {
        LineKind::Bar => Stroke::new(1.0, Color32::from_rgb(210, 210, 210)),
        LineKind::Half => Stroke::new(1.0, Color32::from_rgb(160, 160, 160)),
        LineKind::Quarter => Stroke::new(1.0, Color32::from_rgb(120, 120, 120)),
        LineKind::Eighth => Stroke::new(1.0, Color32::from_rgb(90, 90, 90)),
        LineKind::Sixteenth => Stroke::new(1.0, Color32::from_rgb(70, 70, 70)),
    }
}

fn is_dashed(kind: LineKind) -> bool {
    matches!(kind, LineKind::Eighth | LineKind::Sixteenth)
}

pub fn draw_dashed_vertical_line(painter: &Painter, x: f32, top: f32, bottom: f32, stroke: Stroke) {
    let dash_len = 2.0;
    let gap_len = 2.0;
    let mut y = top;
    while y < bottom {
        let next = (y + dash_len).min(bottom);
        painter.line_segment([Pos2::new(x, y), Pos2::new(x, next)], stroke);
        y += dash_len + gap_len;
    }
}

pub fn draw_selection_box(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_rgba_unmultiplied(100, 150, 255, 50));
    painter.rect_stroke(rect, 0.0, Stroke::new(2.0, Color32::from_rgb(100, 150, 255)));
}

/// Which commands a paint pass handles. The background pass goes under the
/// clips, the overlay pass on top of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintPass {
    Background,
    Overlay,
}

/// Paint draw commands given in content coordinates. `origin` is the screen
/// position of content (0, 0); vertical lines span `top..bottom`.
pub fn paint_commands(
    painter: &Painter,
    commands: &[DrawCommand],
    origin: Pos2,
    top: f32,
    bottom: f32,
    pass: PaintPass,
) {
    for command in commands {
        match (*command, pass) {
            (DrawCommand::Band { min_x, max_x }, PaintPass::Background) => {
                let rect = Rect::from_min_max(
                    Pos2::new(origin.x + min_x, top),
                    Pos2::new(origin.x + max_x, bottom),
                );
                painter.rect_filled(rect, 0.0, BAND_COLOR);
            }
            (DrawCommand::Line { x, kind }, PaintPass::Background) => {
                let x = origin.x + x;
                if is_dashed(kind) {
                    draw_dashed_vertical_line(painter, x, top, bottom, line_stroke(kind));
                } else {
                    painter.line_segment([Pos2::new(x, top), Pos2::new(x, bottom)], line_stroke(kind));
                }
            }
            (DrawCommand::Selection { rect }, PaintPass::Overlay) => {
                draw_selection_box(painter, rect.translate(origin.to_vec2()));
            }
            (DrawCommand::Playhead { x }, PaintPass::Overlay) => {
                let x = origin.x + x;
                painter.line_segment(
                    [Pos2::new(x, top), Pos2::new(x, bottom)],
                    Stroke::new(2.0, PLAYHEAD_COLOR),
                );
            }
            _ => {}
        }
    }
}
