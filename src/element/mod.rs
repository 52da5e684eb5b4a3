use egui::{Painter, Pos2, Rect, TextureId, Vec2};

mod common;
pub(crate) mod image;
pub(crate) mod shape;
pub(crate) mod stroke;

pub use common::{paint_handles, paint_stroke_points, segment_width};
pub use image::{DecodedImage, Image};
pub use shape::{shape_outline, Shape, ShapeKind, ShapeStyle};
pub use stroke::{LineKind, Stroke, StrokePoint, StrokeStyle};

use crate::geometry::HandleId;

/// The shared manipulation capability of anything the manipulate tool can
/// target: floating drawables and measurement guides alike.
pub trait Manipulable {
    fn contains(&self, pos: Pos2) -> bool;
    fn handle_at(&self, pos: Pos2) -> Option<HandleId>;
    fn center(&self) -> Pos2;
    fn translate(&mut self, delta: Vec2);
    fn resize_by_handle(&mut self, handle: HandleId, delta: Vec2);
    fn rotate_by(&mut self, delta: f32);
}

/// A persisted visual object owned by exactly one page.
///
/// Closed union: new variants extend this enum, they never subclass a
/// shared base. Stored in page-local coordinates once committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Stroke(Stroke),
    Shape(Shape),
    Image(Image),
}

impl Drawable {
    pub fn id(&self) -> usize {
        match self {
            Drawable::Stroke(s) => s.id(),
            Drawable::Shape(s) => s.id(),
            Drawable::Image(i) => i.id(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Drawable::Stroke(_) => "stroke",
            Drawable::Shape(_) => "shape",
            Drawable::Image(_) => "image",
        }
    }

    /// The world point used by the commit hit test: a stroke anchors at its
    /// first sample, boxed objects at their center.
    pub fn anchor(&self) -> Pos2 {
        match self {
            Drawable::Stroke(s) => s.anchor(),
            Drawable::Shape(s) => s.anchor(),
            Drawable::Image(i) => i.anchor(),
        }
    }

    /// Axis-aligned bounds of the (possibly rotated) geometry.
    pub fn bounding_rect(&self) -> Rect {
        match self {
            Drawable::Stroke(s) => s.bounds(),
            Drawable::Shape(s) => s.gbox().bounding_rect(),
            Drawable::Image(i) => i.gbox().bounding_rect(),
        }
    }

    pub fn draw(
        &self,
        painter: &Painter,
        viewport: &crate::geometry::Viewport,
        texture: Option<TextureId>,
        with_handles: bool,
    ) {
        match self {
            Drawable::Stroke(s) => s.draw(painter, viewport, with_handles),
            Drawable::Shape(s) => s.draw(painter, viewport, with_handles),
            Drawable::Image(i) => i.draw(painter, viewport, texture, with_handles),
        }
    }
}

impl Manipulable for Drawable {
    fn contains(&self, pos: Pos2) -> bool {
        match self {
            Drawable::Stroke(s) => s.contains(pos),
            Drawable::Shape(s) => s.contains(pos),
            Drawable::Image(i) => i.contains(pos),
        }
    }

    fn handle_at(&self, pos: Pos2) -> Option<HandleId> {
        match self {
            // Strokes are committed directly by the pen and have no handles.
            Drawable::Stroke(_) => None,
            Drawable::Shape(s) => s.handle_at(pos),
            Drawable::Image(i) => i.handle_at(pos),
        }
    }

    fn center(&self) -> Pos2 {
        self.bounding_rect().center()
    }

    fn translate(&mut self, delta: Vec2) {
        match self {
            Drawable::Stroke(s) => s.translate(delta),
            Drawable::Shape(s) => s.translate(delta),
            Drawable::Image(i) => i.translate(delta),
        }
    }

    fn resize_by_handle(&mut self, handle: HandleId, delta: Vec2) {
        match self {
            Drawable::Stroke(s) => s.resize_by_handle(handle, delta),
            Drawable::Shape(s) => s.resize_by_handle(handle, delta),
            Drawable::Image(i) => i.resize_by_handle(handle, delta),
        }
    }

    fn rotate_by(&mut self, delta: f32) {
        match self {
            Drawable::Stroke(s) => s.rotate_by(delta),
            Drawable::Shape(s) => s.rotate_by(delta),
            Drawable::Image(i) => i.rotate_by(delta),
        }
    }
}
