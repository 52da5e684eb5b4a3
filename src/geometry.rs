use egui::{Pos2, Rect, Vec2};

/// Hit radius around a manipulation handle, in world units.
pub const HANDLE_HIT_RADIUS: f32 = 10.0;
/// Distance of the rotation handle above the top edge of the unrotated box.
pub const ROTATION_HANDLE_OFFSET: f32 = 30.0;
/// Smallest width/height a box may be resized to.
pub const MIN_BOX_SIZE: f32 = 2.0;

pub const MIN_ZOOM: f32 = 0.2;
pub const MAX_ZOOM: f32 = 5.0;

/// The pan/zoom state mapping world (canvas) coordinates to screen pixels.
///
/// `to_world(p) = (p - pan) / zoom`, `to_screen(p) = p * zoom + pan`.
/// Process-wide, mutated only by pan/zoom gestures; never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    pub fn to_world(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.pan) / self.zoom).to_pos2()
    }

    pub fn to_screen(&self, world: Pos2) -> Pos2 {
        (world.to_vec2() * self.zoom + self.pan).to_pos2()
    }

    pub fn rect_to_screen(&self, world: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(world.min), self.to_screen(world.max))
    }

    /// Scale a world-space length to screen pixels.
    pub fn scale(&self, len: f32) -> f32 {
        len * self.zoom
    }

    pub fn pan_by(&mut self, screen_delta: Vec2) {
        self.pan += screen_delta;
    }

    /// Zoom by `factor` keeping the world point under `cursor` fixed.
    pub fn zoom_about(&mut self, cursor: Pos2, factor: f32) {
        let anchor = self.to_world(cursor);
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.pan = cursor.to_vec2() - anchor.to_vec2() * self.zoom;
    }
}

/// The five named manipulation handles of a rotated box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleId {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Rotate,
}

/// Rotate `v` by `angle` radians (screen convention, y down).
pub fn rotate_vec(v: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Rotate `p` about `center` by `angle` radians.
pub fn rotate_about(p: Pos2, center: Pos2, angle: f32) -> Pos2 {
    center + rotate_vec(p - center, angle)
}

/// Angle of `p` as seen from `center`. Screen y points down, so the sign
/// is flipped to keep angles growing counter-clockwise on screen.
pub fn pointer_angle(center: Pos2, p: Pos2) -> f32 {
    let v = p - center;
    (-v.y).atan2(v.x)
}

/// Normalize an angle difference to [-PI, PI].
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// An axis-aligned box plus a rotation about its center.
///
/// Handles are positioned in unrotated local space and rotated into place;
/// point containment rotates the query by the negative rotation and does an
/// axis-aligned test. This is the canonical way to hit-test rotated
/// rectangles without transforming the rectangle itself.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RotatedBox {
    pub rect: Rect,
    pub rotation: f32,
}

impl RotatedBox {
    pub fn new(rect: Rect, rotation: f32) -> Self {
        Self { rect, rotation }
    }

    pub fn axis_aligned(rect: Rect) -> Self {
        Self {
            rect,
            rotation: 0.0,
        }
    }

    pub fn center(&self) -> Pos2 {
        self.rect.center()
    }

    /// Corner positions after rotation, in tl/tr/br/bl order.
    pub fn corners(&self) -> [Pos2; 4] {
        let c = self.center();
        [
            rotate_about(self.rect.left_top(), c, self.rotation),
            rotate_about(self.rect.right_top(), c, self.rotation),
            rotate_about(self.rect.right_bottom(), c, self.rotation),
            rotate_about(self.rect.left_bottom(), c, self.rotation),
        ]
    }

    /// Axis-aligned bounds of the rotated corners.
    pub fn bounding_rect(&self) -> Rect {
        let mut bounds = Rect::NOTHING;
        for corner in self.corners() {
            bounds.extend_with(corner);
        }
        bounds
    }

    pub fn contains(&self, p: Pos2) -> bool {
        let local = rotate_about(p, self.center(), -self.rotation);
        self.rect.contains(local)
    }

    /// Handle positions after rotation, corner handles first.
    pub fn handle_positions(&self) -> [(HandleId, Pos2); 5] {
        let c = self.center();
        let rotation_anchor = Pos2::new(c.x, self.rect.min.y - ROTATION_HANDLE_OFFSET);
        [
            (HandleId::TopLeft, self.rect.left_top()),
            (HandleId::TopRight, self.rect.right_top()),
            (HandleId::BottomLeft, self.rect.left_bottom()),
            (HandleId::BottomRight, self.rect.right_bottom()),
            (HandleId::Rotate, rotation_anchor),
        ]
        .map(|(id, p)| (id, rotate_about(p, c, self.rotation)))
    }

    pub fn handle_at(&self, p: Pos2) -> Option<HandleId> {
        self.handle_positions()
            .iter()
            .find(|(_, pos)| pos.distance(p) <= HANDLE_HIT_RADIUS)
            .map(|(id, _)| *id)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.rect = self.rect.translate(delta);
    }

    /// Apply a drag delta to one of the corner handles.
    ///
    /// The world-space delta is first un-rotated into the box's local frame;
    /// horizontal handle components adjust x/width, vertical ones y/height.
    /// Dimensions are clamped at `MIN_BOX_SIZE`.
    pub fn resize_by_handle(&mut self, handle: HandleId, delta: Vec2) {
        let local = rotate_vec(delta, -self.rotation);
        let mut min = self.rect.min;
        let mut max = self.rect.max;
        match handle {
            HandleId::TopLeft => {
                min.x += local.x;
                min.y += local.y;
            }
            HandleId::TopRight => {
                max.x += local.x;
                min.y += local.y;
            }
            HandleId::BottomLeft => {
                min.x += local.x;
                max.y += local.y;
            }
            HandleId::BottomRight => {
                max.x += local.x;
                max.y += local.y;
            }
            HandleId::Rotate => return,
        }
        if max.x - min.x >= MIN_BOX_SIZE && max.y - min.y >= MIN_BOX_SIZE {
            self.rect = Rect::from_min_max(min, max);
        }
    }

    pub fn rotate_by(&mut self, delta: f32) {
        self.rotation = normalize_angle(self.rotation + delta);
    }
}

/// Calculate distance from a point to a line segment (useful for stroke hit testing)
pub fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}

/// Project a point onto a line segment, clamped to the segment's ends.
pub fn project_onto_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> Pos2 {
    let line_vec = line_end - line_start;
    let line_len = line_vec.length();
    if line_len == 0.0 {
        return line_start;
    }
    let point_vec = point - line_start;
    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    line_start + (line_vec * t / line_len)
}

/// Calculate the bounding box for a set of points
pub fn bounds_of_points(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}
