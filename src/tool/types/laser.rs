use egui::{Color32, Painter, Pos2, Stroke as EguiStroke};

use super::super::trait_def::{PointerInput, Tool, ToolCtx};
use crate::geometry::Viewport;
use crate::util::time;

/// Seconds a laser trail point stays visible.
const LASER_FADE_SECS: f32 = 0.8;
const LASER_COLOR: Color32 = Color32::from_rgb(235, 50, 50);
const LASER_WIDTH: f32 = 3.5;

/// A non-marking pointer highlighter: draws a fading trail on the overlay
/// layer and never commits anything.
#[derive(Debug, Clone, Default)]
pub struct LaserTool {
    trail: Vec<(Pos2, f32)>,
    active: bool,
}

impl LaserTool {
    fn prune(&mut self, now: f32) {
        self.trail.retain(|(_, t)| now - t <= LASER_FADE_SECS);
    }
}

impl Tool for LaserTool {
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx<'_>) {
        self.active = false;
        self.trail.clear();
    }

    fn on_pointer_down(&mut self, _ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        self.active = true;
        self.trail.push((input.world, time::current_time()));
    }

    fn on_pointer_move(&mut self, _ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        let now = time::current_time();
        self.prune(now);
        if self.active {
            self.trail.push((input.world, now));
        }
    }

    fn on_pointer_up(&mut self, _ctx: &mut ToolCtx<'_>, _input: &PointerInput) {
        self.active = false;
    }

    fn draw_preview(&self, viewport: &Viewport, painter: &Painter) {
        let now = time::current_time();
        for pair in self.trail.windows(2) {
            let age = now - pair[1].1;
            let fade = 1.0 - age / LASER_FADE_SECS;
            if fade <= 0.0 {
                continue;
            }
            painter.line_segment(
                [viewport.to_screen(pair[0].0), viewport.to_screen(pair[1].0)],
                EguiStroke::new(LASER_WIDTH, LASER_COLOR.gamma_multiply(fade)),
            );
        }
    }
}
