use egui::{Color32, Painter, Stroke as EguiStroke, Vec2};

use crate::element::stroke::{StrokePoint, StrokeStyle};
use crate::geometry::{RotatedBox, Viewport};

pub const HANDLE_SIZE: f32 = 8.0;
pub const HANDLE_COLOR: Color32 = Color32::from_rgb(30, 144, 255);
pub const HANDLE_STROKE_WIDTH: f32 = 2.0;

/// Effective width of the segment between two samples, in world units.
///
/// Pressure-sensitive kinds scale the base thickness by the samples'
/// pressure; all other kinds draw at constant width.
pub fn segment_width(style: &StrokeStyle, a: &StrokePoint, b: &StrokePoint) -> f32 {
    if style.kind.is_pressure_sensitive() {
        style.thickness * ((a.pressure + b.pressure) * 0.5).clamp(0.05, 1.0)
    } else {
        style.thickness
    }
}

/// Color a stroke style resolves to on the overlay painter.
///
/// Eraser strokes have no color of their own; the preview shows a pale
/// translucent path where content will be removed.
pub fn preview_color(style: &StrokeStyle) -> Color32 {
    if style.kind.is_eraser() {
        Color32::from_rgba_unmultiplied(185, 185, 195, 140)
    } else {
        style.color.gamma_multiply(style.opacity)
    }
}

/// Draw a sampled polyline as connected round-capped segments.
///
/// Shared by committed stroke drawing and the pen/eraser live preview.
pub fn paint_stroke_points(
    painter: &Painter,
    viewport: &Viewport,
    points: &[StrokePoint],
    style: &StrokeStyle,
) {
    if points.len() < 2 {
        return;
    }
    let color = preview_color(style);
    for pair in points.windows(2) {
        let width = viewport.scale(segment_width(style, &pair[0], &pair[1]));
        painter.line_segment(
            [
                viewport.to_screen(pair[0].pos),
                viewport.to_screen(pair[1].pos),
            ],
            EguiStroke::new(width, color),
        );
    }
}

/// Draw the manipulation chrome of a rotated box: outline, corner handles,
/// and the rotation stalk above the top edge.
pub fn paint_handles(painter: &Painter, viewport: &Viewport, gbox: &RotatedBox) {
    let corners = gbox.corners().map(|c| viewport.to_screen(c));
    let mut outline: Vec<_> = corners.to_vec();
    outline.push(corners[0]);
    painter.add(egui::Shape::line(
        outline,
        EguiStroke::new(1.0, HANDLE_COLOR),
    ));

    let handles = gbox.handle_positions();
    let center = viewport.to_screen(gbox.center());
    // stalk from center to the rotation handle
    let rotation_pos = viewport.to_screen(handles[4].1);
    painter.line_segment([center, rotation_pos], EguiStroke::new(1.0, HANDLE_COLOR));
    painter.circle_stroke(
        rotation_pos,
        HANDLE_SIZE / 2.0,
        EguiStroke::new(HANDLE_STROKE_WIDTH, HANDLE_COLOR),
    );

    for (_, pos) in &handles[..4] {
        let rect =
            egui::Rect::from_center_size(viewport.to_screen(*pos), Vec2::splat(HANDLE_SIZE));
        painter.rect_filled(rect, 0.0, HANDLE_COLOR);
    }
}
