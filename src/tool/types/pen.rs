use egui::Painter;

use super::super::trait_def::{PointerInput, Tool, ToolCtx};
use crate::element::{paint_stroke_points, Drawable, Stroke, StrokePoint, StrokeStyle};
use crate::geometry::Viewport;
use crate::id;

/// Freehand drawing: collects samples while the pointer is down and
/// commits the finished stroke on release. Guide snapping applies to every
/// sample while a guide is active.
#[derive(Debug, Clone)]
pub struct PenTool {
    pub style: StrokeStyle,
    live: Vec<StrokePoint>,
    drawing: bool,
}

impl Default for PenTool {
    fn default() -> Self {
        Self {
            style: StrokeStyle::default(),
            live: Vec::new(),
            drawing: false,
        }
    }
}

impl PenTool {
    /// Commit the in-progress stroke. Strokes with fewer than 2 samples
    /// are dropped; no zero/one-point marks.
    fn finish(&mut self, ctx: &mut ToolCtx<'_>) {
        self.drawing = false;
        let points = std::mem::take(&mut self.live);
        if points.len() < 2 {
            return;
        }
        let stroke = Stroke::new(id::next_id(), points, self.style);
        if ctx.document.commit(Drawable::Stroke(stroke)).is_committed() {
            *ctx.mutated = true;
        }
    }
}

impl Tool for PenTool {
    fn on_deactivate(&mut self, ctx: &mut ToolCtx<'_>) {
        // an in-flight gesture must not survive a tool switch
        self.finish(ctx);
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        self.drawing = true;
        self.live.clear();
        self.live.push(StrokePoint::new(
            ctx.snap_to_guide(input.world),
            input.pressure_or_default(),
        ));
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        if self.drawing {
            self.live.push(StrokePoint::new(
                ctx.snap_to_guide(input.world),
                input.pressure_or_default(),
            ));
        }
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolCtx<'_>, _input: &PointerInput) {
        self.finish(ctx);
    }

    fn draw_preview(&self, viewport: &Viewport, painter: &Painter) {
        paint_stroke_points(painter, viewport, &self.live, &self.style);
    }
}
