use egui::{Color32, Painter, Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::element::common;
use crate::geometry::{self, HandleId, RotatedBox, Viewport};

/// The line style a stroke was drawn with.
///
/// `Fountain` scales segment width by sample pressure; the others draw at
/// constant width. `Eraser` composites subtractively instead of on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    Fountain,
    Ballpoint,
    Highlighter,
    Eraser,
}

impl LineKind {
    pub fn is_pressure_sensitive(&self) -> bool {
        matches!(self, LineKind::Fountain)
    }

    pub fn is_eraser(&self) -> bool {
        matches!(self, LineKind::Eraser)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Color32,
    pub kind: LineKind,
    pub thickness: f32,
    pub opacity: f32,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(25, 35, 60),
            kind: LineKind::Fountain,
            thickness: 3.0,
            opacity: 1.0,
        }
    }
}

impl StrokeStyle {
    /// The fixed style eraser strokes are committed with.
    pub fn eraser(thickness: f32) -> Self {
        Self {
            color: Color32::TRANSPARENT,
            kind: LineKind::Eraser,
            thickness,
            opacity: 1.0,
        }
    }
}

/// One input sample of a stroke: position plus pen pressure in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub pos: Pos2,
    pub pressure: f32,
}

impl StrokePoint {
    pub fn new(pos: Pos2, pressure: f32) -> Self {
        Self {
            pos,
            pressure: pressure.clamp(0.0, 1.0),
        }
    }
}

/// A committed freehand stroke: an ordered sample sequence plus its style.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    id: usize,
    points: Vec<StrokePoint>,
    style: StrokeStyle,
}

impl Stroke {
    pub fn new(id: usize, points: Vec<StrokePoint>, style: StrokeStyle) -> Self {
        Self { id, points, style }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn style(&self) -> &StrokeStyle {
        &self.style
    }

    /// First sample position; the commit hit-test anchor for strokes.
    pub fn anchor(&self) -> Pos2 {
        self.points.first().map(|p| p.pos).unwrap_or(Pos2::ZERO)
    }

    pub fn bounds(&self) -> Rect {
        let positions: Vec<Pos2> = self.points.iter().map(|p| p.pos).collect();
        geometry::bounds_of_points(&positions, self.style.thickness / 2.0)
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        if self.points.len() < 2 {
            return false;
        }
        for pair in self.points.windows(2) {
            let width = common::segment_width(&self.style, &pair[0], &pair[1]);
            let distance = geometry::distance_to_line_segment(pos, pair[0].pos, pair[1].pos);
            if distance <= width / 2.0 {
                return true;
            }
        }
        false
    }

    pub fn translate(&mut self, delta: Vec2) {
        for point in &mut self.points {
            point.pos += delta;
        }
    }

    /// Scale every sample into `new_rect`, preserving relative layout.
    pub fn resize(&mut self, new_rect: Rect) {
        let old_rect = self.bounds();
        if old_rect.width() <= 0.0 || old_rect.height() <= 0.0 {
            return;
        }

        let scale_x = new_rect.width() / old_rect.width();
        let scale_y = new_rect.height() / old_rect.height();

        for point in &mut self.points {
            let relative_x = (point.pos.x - old_rect.min.x) / old_rect.width();
            let relative_y = (point.pos.y - old_rect.min.y) / old_rect.height();
            point.pos.x = new_rect.min.x + relative_x * new_rect.width();
            point.pos.y = new_rect.min.y + relative_y * new_rect.height();
        }

        self.style.thickness *= (scale_x + scale_y) / 2.0;
    }

    pub fn resize_by_handle(&mut self, handle: HandleId, delta: Vec2) {
        let mut gbox = RotatedBox::axis_aligned(self.bounds());
        gbox.resize_by_handle(handle, delta);
        self.resize(gbox.rect);
    }

    pub fn rotate_by(&mut self, delta: f32) {
        let center = self.bounds().center();
        for point in &mut self.points {
            point.pos = geometry::rotate_about(point.pos, center, delta);
        }
    }

    pub fn draw(&self, painter: &Painter, viewport: &Viewport, with_handles: bool) {
        common::paint_stroke_points(painter, viewport, &self.points, &self.style);
        if with_handles {
            let rect = viewport.rect_to_screen(self.bounds());
            painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, common::HANDLE_COLOR));
        }
    }
}
