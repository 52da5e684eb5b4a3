use egui::{Color32, Painter, Pos2, Rect, Stroke as EguiStroke, Vec2};
use serde::{Deserialize, Serialize};

use crate::element::common;
use crate::geometry::{self, HandleId, RotatedBox, Viewport};

/// How far the top edge of a parallelogram is sheared, as a fraction of width.
const PARALLELOGRAM_SHEAR: f32 = 0.2;
/// Segments used to approximate a circle outline.
const CIRCLE_SEGMENTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Parallelogram,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub color: Color32,
    pub thickness: f32,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            color: Color32::from_rgb(25, 35, 60),
            thickness: 2.0,
        }
    }
}

/// A geometric shape: a rotated bounding box interpreted by its kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: usize,
    kind: ShapeKind,
    gbox: RotatedBox,
    style: ShapeStyle,
}

impl Shape {
    pub fn new(id: usize, kind: ShapeKind, rect: Rect, style: ShapeStyle) -> Self {
        Self {
            id,
            kind,
            gbox: RotatedBox::axis_aligned(rect),
            style,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn gbox(&self) -> &RotatedBox {
        &self.gbox
    }

    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.gbox.rotation = rotation;
    }

    pub fn anchor(&self) -> Pos2 {
        self.gbox.center()
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.gbox.contains(pos)
    }

    pub fn handle_at(&self, pos: Pos2) -> Option<HandleId> {
        self.gbox.handle_at(pos)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.gbox.translate(delta);
    }

    pub fn resize_by_handle(&mut self, handle: HandleId, delta: Vec2) {
        self.gbox.resize_by_handle(handle, delta);
    }

    pub fn rotate_by(&mut self, delta: f32) {
        self.gbox.rotate_by(delta);
    }

    /// Outline vertices in world space, rotated into place. The polyline is
    /// open; consumers close it by connecting the last vertex to the first.
    pub fn outline(&self) -> Vec<Pos2> {
        shape_outline(self.kind, &self.gbox)
    }

    pub fn draw(&self, painter: &Painter, viewport: &Viewport, with_handles: bool) {
        let mut points: Vec<Pos2> = self
            .outline()
            .into_iter()
            .map(|p| viewport.to_screen(p))
            .collect();
        if let Some(first) = points.first().copied() {
            points.push(first);
        }
        painter.add(egui::Shape::line(
            points,
            EguiStroke::new(viewport.scale(self.style.thickness), self.style.color),
        ));
        if with_handles {
            common::paint_handles(painter, viewport, &self.gbox);
        }
    }
}

/// Outline vertices for a shape kind within a rotated box.
pub fn shape_outline(kind: ShapeKind, gbox: &RotatedBox) -> Vec<Pos2> {
    let rect = gbox.rect;
    let center = gbox.center();
    let local: Vec<Pos2> = match kind {
        ShapeKind::Rectangle => vec![
            rect.left_top(),
            rect.right_top(),
            rect.right_bottom(),
            rect.left_bottom(),
        ],
        ShapeKind::Parallelogram => {
            let shear = rect.width() * PARALLELOGRAM_SHEAR;
            vec![
                Pos2::new(rect.min.x + shear, rect.min.y),
                Pos2::new(rect.max.x, rect.min.y),
                Pos2::new(rect.max.x - shear, rect.max.y),
                Pos2::new(rect.min.x, rect.max.y),
            ]
        }
        ShapeKind::Circle => {
            let rx = rect.width() / 2.0;
            let ry = rect.height() / 2.0;
            (0..CIRCLE_SEGMENTS)
                .map(|i| {
                    let t = i as f32 / CIRCLE_SEGMENTS as f32 * std::f32::consts::TAU;
                    Pos2::new(center.x + rx * t.cos(), center.y + ry * t.sin())
                })
                .collect()
        }
    };
    local
        .into_iter()
        .map(|p| geometry::rotate_about(p, center, gbox.rotation))
        .collect()
}
