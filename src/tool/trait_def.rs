use egui::{Painter, Pos2};

use crate::document::Document;
use crate::element::Drawable;
use crate::geometry::Viewport;
use crate::guide::Guide;

/// One pointer lifecycle sample, already converted to world coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PointerInput {
    pub world: Pos2,
    /// Pressure value between 0.0 and 1.0, or None if pressure is not supported
    pub pressure: Option<f32>,
}

impl PointerInput {
    pub fn new(world: Pos2) -> Self {
        Self {
            world,
            pressure: None,
        }
    }

    pub fn with_pressure(world: Pos2, pressure: f32) -> Self {
        Self {
            world,
            pressure: Some(pressure),
        }
    }

    pub fn pressure_or_default(&self) -> f32 {
        self.pressure.unwrap_or(1.0)
    }
}

/// What the manipulate tool operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManipulateTarget {
    /// The engine's floating drawable (not yet part of any page).
    Floating,
    /// The active measurement guide.
    Guide,
}

/// A tool switch requested from inside a handler, applied by the state
/// machine after the current dispatch returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolRequest {
    Manipulate(ManipulateTarget),
}

/// The mutable engine state a tool handler may act on during dispatch.
pub struct ToolCtx<'a> {
    pub document: &'a mut Document,
    pub viewport: &'a mut Viewport,
    pub guide: &'a mut Option<Guide>,
    pub floating: &'a mut Option<Drawable>,
    /// Set by handlers whenever document content changed; the engine
    /// schedules a debounced save when it sees this.
    pub mutated: &'a mut bool,
    pub requested: &'a mut Option<ToolRequest>,
}

impl ToolCtx<'_> {
    /// Pass a candidate pen point through the active guide's snapping.
    pub fn snap_to_guide(&self, p: Pos2) -> Pos2 {
        self.guide.as_ref().and_then(|g| g.snap(p)).unwrap_or(p)
    }

    pub fn request(&mut self, request: ToolRequest) {
        *self.requested = Some(request);
    }
}

/// A tool handler: reacts to the pointer lifecycle while active, and may
/// draw a live preview on the overlay layer each frame.
///
/// Pointer up (or leave, which the engine reports as up) always ends the
/// current gesture; a handler must never stay armed past it.
pub trait Tool {
    fn on_activate(&mut self, _ctx: &mut ToolCtx<'_>) {}
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx<'_>) {}

    fn on_pointer_down(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput);
    fn on_pointer_move(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput);
    fn on_pointer_up(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput);

    fn draw_preview(&self, _viewport: &Viewport, _painter: &Painter) {}
}
