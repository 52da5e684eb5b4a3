use egui::{Painter, Pos2, Rect};

use super::super::trait_def::{ManipulateTarget, PointerInput, Tool, ToolCtx, ToolRequest};
use crate::element::{Drawable, Shape, ShapeKind, ShapeStyle};
use crate::geometry::{Viewport, MIN_BOX_SIZE};
use crate::id;

/// Two-point shape definition: press anchors one corner, dragging previews
/// the spanned box, release promotes the shape to the floating object and
/// hands off to the manipulate tool so it is adjustable before commit.
#[derive(Debug, Clone)]
pub struct DefineShapeTool {
    pub kind: ShapeKind,
    pub style: ShapeStyle,
    anchor: Option<Pos2>,
    cursor: Option<Pos2>,
}

impl DefineShapeTool {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            style: ShapeStyle::default(),
            anchor: None,
            cursor: None,
        }
    }

    /// The spanned box; `Rect::from_two_pos` normalizes a drag in any
    /// direction (a flipped box previews identically).
    fn spanned(&self) -> Option<Rect> {
        match (self.anchor, self.cursor) {
            (Some(a), Some(b)) => Some(Rect::from_two_pos(a, b)),
            _ => None,
        }
    }
}

impl Tool for DefineShapeTool {
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx<'_>) {
        self.anchor = None;
        self.cursor = None;
    }

    fn on_pointer_down(&mut self, _ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        self.anchor = Some(input.world);
        self.cursor = Some(input.world);
    }

    fn on_pointer_move(&mut self, _ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        if self.anchor.is_some() {
            self.cursor = Some(input.world);
        }
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolCtx<'_>, _input: &PointerInput) {
        if let Some(rect) = self.spanned() {
            // a click without a drag defines nothing
            if rect.width() >= MIN_BOX_SIZE && rect.height() >= MIN_BOX_SIZE {
                let shape = Shape::new(id::next_id(), self.kind, rect, self.style);
                *ctx.floating = Some(Drawable::Shape(shape));
                ctx.request(ToolRequest::Manipulate(ManipulateTarget::Floating));
            }
        }
        self.anchor = None;
        self.cursor = None;
    }

    fn draw_preview(&self, viewport: &Viewport, painter: &Painter) {
        if let Some(rect) = self.spanned() {
            let preview = Shape::new(0, self.kind, rect, self.style);
            preview.draw(painter, viewport, false);
        }
    }
}
