use egui::{Color32, Painter, Pos2, Rect, Stroke as EguiStroke, Vec2};

use crate::element::{paint_handles, Manipulable};
use crate::geometry::{self, HandleId, RotatedBox, Viewport};

/// World-unit tolerance within which pen input snaps to a guide edge.
pub const SNAP_RADIUS: f32 = 20.0;

const GUIDE_FILL: Color32 = Color32::from_rgba_premultiplied(11, 14, 19, 40);
const GUIDE_OUTLINE: Color32 = Color32::from_rgb(90, 120, 170);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuideKind {
    Ruler,
    SetSquare,
    Compass,
}

/// A transient measurement aid: never committed, never persisted.
///
/// All three kinds share the rotated-box geometry and handle set; only the
/// snap surface differs: a ruler snaps to its long edges, a set square to
/// its triangle edges, a compass to its rim.
#[derive(Debug, Clone, PartialEq)]
pub struct Guide {
    kind: GuideKind,
    gbox: RotatedBox,
}

impl Guide {
    pub fn ruler(center: Pos2) -> Self {
        Self {
            kind: GuideKind::Ruler,
            gbox: RotatedBox::axis_aligned(Rect::from_center_size(center, Vec2::new(420.0, 60.0))),
        }
    }

    pub fn set_square(center: Pos2) -> Self {
        Self {
            kind: GuideKind::SetSquare,
            gbox: RotatedBox::axis_aligned(Rect::from_center_size(center, Vec2::new(320.0, 320.0))),
        }
    }

    pub fn compass(center: Pos2) -> Self {
        Self {
            kind: GuideKind::Compass,
            gbox: RotatedBox::axis_aligned(Rect::from_center_size(center, Vec2::new(240.0, 240.0))),
        }
    }

    pub fn kind(&self) -> GuideKind {
        self.kind
    }

    pub fn gbox(&self) -> &RotatedBox {
        &self.gbox
    }

    fn radius(&self) -> f32 {
        self.gbox.rect.width().min(self.gbox.rect.height()) / 2.0
    }

    /// World-space edge segments the pen snaps to. Empty for the compass,
    /// whose rim is handled radially.
    fn snap_edges(&self) -> Vec<[Pos2; 2]> {
        let corners = self.gbox.corners();
        match self.kind {
            // both long edges of the ruler
            GuideKind::Ruler => vec![[corners[0], corners[1]], [corners[3], corners[2]]],
            // right triangle: vertical leg, horizontal leg, hypotenuse
            GuideKind::SetSquare => {
                let (tl, br, bl) = (corners[0], corners[2], corners[3]);
                vec![[tl, bl], [bl, br], [br, tl]]
            }
            GuideKind::Compass => Vec::new(),
        }
    }

    /// Adjust a candidate pen point toward this guide's edge, if the point
    /// is within [`SNAP_RADIUS`] of it.
    pub fn snap(&self, p: Pos2) -> Option<Pos2> {
        match self.kind {
            GuideKind::Compass => {
                let center = self.gbox.center();
                let radius = self.radius();
                let d = center.distance(p);
                if d > 0.0 && (d - radius).abs() <= SNAP_RADIUS {
                    Some(center + (p - center) * (radius / d))
                } else {
                    None
                }
            }
            _ => {
                let mut best: Option<(f32, Pos2)> = None;
                for [a, b] in self.snap_edges() {
                    let projected = geometry::project_onto_segment(p, a, b);
                    let dist = projected.distance(p);
                    if dist <= SNAP_RADIUS && best.map_or(true, |(d, _)| dist < d) {
                        best = Some((dist, projected));
                    }
                }
                best.map(|(_, p)| p)
            }
        }
    }

    pub fn draw(&self, painter: &Painter, viewport: &Viewport, with_handles: bool) {
        let outline = EguiStroke::new(1.5, GUIDE_OUTLINE);
        match self.kind {
            GuideKind::Compass => {
                let center = viewport.to_screen(self.gbox.center());
                let radius = viewport.scale(self.radius());
                painter.circle_filled(center, radius, GUIDE_FILL);
                painter.circle_stroke(center, radius, outline);
                painter.circle_filled(center, 2.5, GUIDE_OUTLINE);
            }
            GuideKind::Ruler => {
                let corners = self.gbox.corners().map(|c| viewport.to_screen(c));
                painter.add(egui::Shape::convex_polygon(
                    corners.to_vec(),
                    GUIDE_FILL,
                    outline,
                ));
                self.draw_ticks(painter, viewport);
            }
            GuideKind::SetSquare => {
                let corners = self.gbox.corners().map(|c| viewport.to_screen(c));
                let triangle = vec![corners[0], corners[3], corners[2]];
                painter.add(egui::Shape::convex_polygon(triangle, GUIDE_FILL, outline));
            }
        }
        if with_handles {
            paint_handles(painter, viewport, &self.gbox);
        }
    }

    /// Centimeter-style tick marks along the ruler's top edge.
    fn draw_ticks(&self, painter: &Painter, viewport: &Viewport) {
        let corners = self.gbox.corners();
        let [top_left, top_right] = [corners[0], corners[1]];
        let along = (top_right - top_left).normalized();
        let down = geometry::rotate_vec(Vec2::new(0.0, 1.0), self.gbox.rotation);
        let length = top_left.distance(top_right);
        let mut offset = 0.0;
        let mut index = 0u32;
        while offset <= length {
            let base = top_left + along * offset;
            let tick = if index % 5 == 0 { 14.0 } else { 8.0 };
            painter.line_segment(
                [
                    viewport.to_screen(base),
                    viewport.to_screen(base + down * tick),
                ],
                EguiStroke::new(1.0, GUIDE_OUTLINE),
            );
            offset += 20.0;
            index += 1;
        }
    }
}

impl Manipulable for Guide {
    fn contains(&self, pos: Pos2) -> bool {
        match self.kind {
            GuideKind::Compass => self.gbox.center().distance(pos) <= self.radius(),
            _ => self.gbox.contains(pos),
        }
    }

    fn handle_at(&self, pos: Pos2) -> Option<HandleId> {
        self.gbox.handle_at(pos)
    }

    fn center(&self) -> Pos2 {
        self.gbox.center()
    }

    fn translate(&mut self, delta: Vec2) {
        self.gbox.translate(delta);
    }

    fn resize_by_handle(&mut self, handle: HandleId, delta: Vec2) {
        self.gbox.resize_by_handle(handle, delta);
    }

    fn rotate_by(&mut self, delta: f32) {
        self.gbox.rotate_by(delta);
    }
}
