pub mod trait_def;
pub mod types;

pub use trait_def::{ManipulateTarget, PointerInput, Tool, ToolCtx, ToolRequest};
pub use types::{DefineShapeTool, EraserTool, LaserTool, ManipulateTool, PenTool};

use egui::Painter;
use log::info;

use crate::geometry::Viewport;

/// Closed union of the tool handlers. New tools extend this enum.
#[derive(Debug, Clone)]
pub enum ToolType {
    Pen(PenTool),
    Eraser(EraserTool),
    Laser(LaserTool),
    DefineShape(DefineShapeTool),
    Manipulate(ManipulateTool),
}

impl Default for ToolType {
    fn default() -> Self {
        Self::Pen(PenTool::default())
    }
}

impl ToolType {
    pub fn name(&self) -> &'static str {
        match self {
            ToolType::Pen(_) => "pen",
            ToolType::Eraser(_) => "eraser",
            ToolType::Laser(_) => "laser",
            ToolType::DefineShape(_) => "define-shape",
            ToolType::Manipulate(_) => "manipulate",
        }
    }
}

impl Tool for ToolType {
    fn on_activate(&mut self, ctx: &mut ToolCtx<'_>) {
        match self {
            ToolType::Pen(t) => t.on_activate(ctx),
            ToolType::Eraser(t) => t.on_activate(ctx),
            ToolType::Laser(t) => t.on_activate(ctx),
            ToolType::DefineShape(t) => t.on_activate(ctx),
            ToolType::Manipulate(t) => t.on_activate(ctx),
        }
    }

    fn on_deactivate(&mut self, ctx: &mut ToolCtx<'_>) {
        match self {
            ToolType::Pen(t) => t.on_deactivate(ctx),
            ToolType::Eraser(t) => t.on_deactivate(ctx),
            ToolType::Laser(t) => t.on_deactivate(ctx),
            ToolType::DefineShape(t) => t.on_deactivate(ctx),
            ToolType::Manipulate(t) => t.on_deactivate(ctx),
        }
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        match self {
            ToolType::Pen(t) => t.on_pointer_down(ctx, input),
            ToolType::Eraser(t) => t.on_pointer_down(ctx, input),
            ToolType::Laser(t) => t.on_pointer_down(ctx, input),
            ToolType::DefineShape(t) => t.on_pointer_down(ctx, input),
            ToolType::Manipulate(t) => t.on_pointer_down(ctx, input),
        }
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        match self {
            ToolType::Pen(t) => t.on_pointer_move(ctx, input),
            ToolType::Eraser(t) => t.on_pointer_move(ctx, input),
            ToolType::Laser(t) => t.on_pointer_move(ctx, input),
            ToolType::DefineShape(t) => t.on_pointer_move(ctx, input),
            ToolType::Manipulate(t) => t.on_pointer_move(ctx, input),
        }
    }

    fn on_pointer_up(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        match self {
            ToolType::Pen(t) => t.on_pointer_up(ctx, input),
            ToolType::Eraser(t) => t.on_pointer_up(ctx, input),
            ToolType::Laser(t) => t.on_pointer_up(ctx, input),
            ToolType::DefineShape(t) => t.on_pointer_up(ctx, input),
            ToolType::Manipulate(t) => t.on_pointer_up(ctx, input),
        }
    }

    fn draw_preview(&self, viewport: &Viewport, painter: &Painter) {
        match self {
            ToolType::Pen(t) => t.draw_preview(viewport, painter),
            ToolType::Eraser(t) => t.draw_preview(viewport, painter),
            ToolType::Laser(t) => t.draw_preview(viewport, painter),
            ToolType::DefineShape(t) => t.draw_preview(viewport, painter),
            ToolType::Manipulate(t) => t.draw_preview(viewport, painter),
        }
    }
}

/// Owns the single active tool handler and guarantees the
/// deactivate-then-activate ordering on every switch.
#[derive(Debug, Default)]
pub struct ToolStateMachine {
    active: ToolType,
}

impl ToolStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &ToolType {
        &self.active
    }

    /// Mutable access for UI-side style tweaks (pen color, shape kind).
    pub fn active_mut(&mut self) -> &mut ToolType {
        &mut self.active
    }

    /// Switch handlers: the outgoing handler's deactivation hook runs
    /// before the incoming handler's activation hook.
    pub fn set_tool(&mut self, ctx: &mut ToolCtx<'_>, next: ToolType) {
        info!("tool switch: {} -> {}", self.active.name(), next.name());
        self.active.on_deactivate(ctx);
        self.active = next;
        self.active.on_activate(ctx);
    }

    pub fn pointer_down(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        self.active.on_pointer_down(ctx, input);
        self.apply_request(ctx);
    }

    pub fn pointer_move(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        self.active.on_pointer_move(ctx, input);
        self.apply_request(ctx);
    }

    pub fn pointer_up(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        self.active.on_pointer_up(ctx, input);
        self.apply_request(ctx);
    }

    pub fn draw_preview(&self, viewport: &Viewport, painter: &Painter) {
        self.active.draw_preview(viewport, painter);
    }

    /// Apply a transition a handler requested during dispatch. Requests are
    /// deferred to here so a handler never re-enters itself mid-callback.
    fn apply_request(&mut self, ctx: &mut ToolCtx<'_>) {
        if let Some(request) = ctx.requested.take() {
            match request {
                ToolRequest::Manipulate(target) => {
                    self.set_tool(ctx, ToolType::Manipulate(ManipulateTool::new(target)));
                }
            }
        }
    }
}
