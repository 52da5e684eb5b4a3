use egui::Painter;

use super::super::trait_def::{PointerInput, Tool, ToolCtx};
use crate::element::{paint_stroke_points, Drawable, Stroke, StrokePoint, StrokeStyle};
use crate::geometry::Viewport;
use crate::id;

/// Same lifecycle as the pen, but committed strokes carry the eraser style
/// so the raster replay composites them subtractively at constant width.
#[derive(Debug, Clone)]
pub struct EraserTool {
    pub thickness: f32,
    live: Vec<StrokePoint>,
    drawing: bool,
}

impl Default for EraserTool {
    fn default() -> Self {
        Self {
            thickness: 18.0,
            live: Vec::new(),
            drawing: false,
        }
    }
}

impl EraserTool {
    fn style(&self) -> StrokeStyle {
        StrokeStyle::eraser(self.thickness)
    }

    fn finish(&mut self, ctx: &mut ToolCtx<'_>) {
        self.drawing = false;
        let points = std::mem::take(&mut self.live);
        if points.len() < 2 {
            return;
        }
        let stroke = Stroke::new(id::next_id(), points, self.style());
        if ctx.document.commit(Drawable::Stroke(stroke)).is_committed() {
            *ctx.mutated = true;
        }
    }
}

impl Tool for EraserTool {
    fn on_deactivate(&mut self, ctx: &mut ToolCtx<'_>) {
        self.finish(ctx);
    }

    fn on_pointer_down(&mut self, _ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        self.drawing = true;
        self.live.clear();
        self.live
            .push(StrokePoint::new(input.world, input.pressure_or_default()));
    }

    fn on_pointer_move(&mut self, _ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        if self.drawing {
            self.live
                .push(StrokePoint::new(input.world, input.pressure_or_default()));
        }
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolCtx<'_>, _input: &PointerInput) {
        self.finish(ctx);
    }

    fn draw_preview(&self, viewport: &Viewport, painter: &Painter) {
        let style = self.style();
        paint_stroke_points(painter, viewport, &self.live, &style);
    }
}
