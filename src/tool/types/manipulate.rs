use egui::Pos2;

use super::super::trait_def::{ManipulateTarget, PointerInput, Tool, ToolCtx};
use crate::element::Manipulable;
use crate::geometry::{self, HandleId};

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Translate { last: Pos2 },
    Resize { handle: HandleId, last: Pos2 },
    Rotate { last_angle: f32 },
}

/// Adjusts its target (the floating drawable or the active guide) by
/// dragging: a handle starts a resize or rotation, the body a translation,
/// anywhere else is a no-op.
///
/// Rotation tracks the change in pointer angle about the object's center
/// relative to the previous sample, so the object rotates smoothly instead
/// of snapping to the handle's absolute angle.
#[derive(Debug, Clone)]
pub struct ManipulateTool {
    target: ManipulateTarget,
    gesture: Option<Gesture>,
}

impl ManipulateTool {
    pub fn new(target: ManipulateTarget) -> Self {
        Self {
            target,
            gesture: None,
        }
    }

    pub fn target(&self) -> ManipulateTarget {
        self.target
    }

    fn object<'b>(&self, ctx: &'b mut ToolCtx<'_>) -> Option<&'b mut dyn Manipulable> {
        match self.target {
            ManipulateTarget::Floating => ctx
                .floating
                .as_mut()
                .map(|d| d as &mut dyn Manipulable),
            ManipulateTarget::Guide => ctx.guide.as_mut().map(|g| g as &mut dyn Manipulable),
        }
    }
}

impl Tool for ManipulateTool {
    fn on_deactivate(&mut self, _ctx: &mut ToolCtx<'_>) {
        self.gesture = None;
    }

    fn on_pointer_down(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        let p = input.world;
        let Some(object) = self.object(ctx) else {
            return;
        };
        self.gesture = match object.handle_at(p) {
            Some(HandleId::Rotate) => Some(Gesture::Rotate {
                last_angle: geometry::pointer_angle(object.center(), p),
            }),
            Some(handle) => Some(Gesture::Resize { handle, last: p }),
            None if object.contains(p) => Some(Gesture::Translate { last: p }),
            None => None,
        };
    }

    fn on_pointer_move(&mut self, ctx: &mut ToolCtx<'_>, input: &PointerInput) {
        let p = input.world;
        let Some(mut gesture) = self.gesture else {
            return;
        };
        let Some(object) = self.object(ctx) else {
            return;
        };
        match &mut gesture {
            Gesture::Translate { last } => {
                object.translate(p - *last);
                *last = p;
            }
            Gesture::Resize { handle, last } => {
                object.resize_by_handle(*handle, p - *last);
                *last = p;
            }
            Gesture::Rotate { last_angle } => {
                let angle = geometry::pointer_angle(object.center(), p);
                // screen y points down, so a growing pointer angle is a
                // counter-clockwise turn on screen
                object.rotate_by(geometry::normalize_angle(*last_angle - angle));
                *last_angle = angle;
            }
        }
        self.gesture = Some(gesture);
    }

    fn on_pointer_up(&mut self, _ctx: &mut ToolCtx<'_>, _input: &PointerInput) {
        self.gesture = None;
    }
}
