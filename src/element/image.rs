use egui::{Color32, Painter, Pos2, Rect, TextureId, Vec2};

use crate::element::common;
use crate::geometry::{HandleId, RotatedBox, Viewport};

/// Decoded RGBA8 pixel data, straight (unpremultiplied) alpha.
#[derive(Clone, PartialEq)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

impl DecodedImage {
    pub fn sample(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ]
    }
}

/// A placed bitmap image.
///
/// `pixels` is the renderable decoded data and is absent until the async
/// decode completes; `payload` is the original encoded bytes, retained so
/// persistence can embed the image without re-encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    id: usize,
    gbox: RotatedBox,
    pixels: Option<DecodedImage>,
    payload: Vec<u8>,
}

impl Image {
    pub fn new(id: usize, rect: Rect, payload: Vec<u8>) -> Self {
        Self {
            id,
            gbox: RotatedBox::axis_aligned(rect),
            pixels: None,
            payload,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn gbox(&self) -> &RotatedBox {
        &self.gbox
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.gbox.rotation = rotation;
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn pixels(&self) -> Option<&DecodedImage> {
        self.pixels.as_ref()
    }

    /// Attach decoded pixel data once the async decode completes.
    pub fn set_pixels(&mut self, pixels: DecodedImage) {
        self.pixels = Some(pixels);
    }

    pub fn anchor(&self) -> Pos2 {
        self.gbox.center()
    }

    pub fn contains(&self, pos: Pos2) -> bool {
        self.gbox.contains(pos)
    }

    pub fn handle_at(&self, pos: Pos2) -> Option<HandleId> {
        self.gbox.handle_at(pos)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.gbox.translate(delta);
    }

    pub fn resize_by_handle(&mut self, handle: HandleId, delta: Vec2) {
        self.gbox.resize_by_handle(handle, delta);
    }

    pub fn rotate_by(&mut self, delta: f32) {
        self.gbox.rotate_by(delta);
    }

    /// Draw the image as a textured quad rotated into place.
    ///
    /// Until a texture exists (pixels not yet decoded or not yet uploaded)
    /// a placeholder box is shown instead.
    pub fn draw(
        &self,
        painter: &Painter,
        viewport: &Viewport,
        texture: Option<TextureId>,
        with_handles: bool,
    ) {
        let corners = self.gbox.corners().map(|c| viewport.to_screen(c));
        if let Some(texture) = texture {
            let uvs = [
                Pos2::new(0.0, 0.0),
                Pos2::new(1.0, 0.0),
                Pos2::new(1.0, 1.0),
                Pos2::new(0.0, 1.0),
            ];
            let mut mesh = egui::Mesh::with_texture(texture);
            for (pos, uv) in corners.iter().zip(uvs) {
                mesh.vertices.push(egui::epaint::Vertex {
                    pos: *pos,
                    uv,
                    color: Color32::WHITE,
                });
            }
            mesh.indices.extend_from_slice(&[0, 1, 2, 0, 2, 3]);
            painter.add(egui::Shape::mesh(mesh));
        } else {
            let mut outline: Vec<Pos2> = corners.to_vec();
            outline.push(corners[0]);
            painter.add(egui::Shape::convex_polygon(
                corners.to_vec(),
                Color32::from_gray(200),
                egui::Stroke::new(1.0, Color32::from_gray(100)),
            ));
            painter.add(egui::Shape::line(
                outline,
                egui::Stroke::new(1.0, Color32::from_gray(100)),
            ));
        }
        if with_handles {
            common::paint_handles(painter, viewport, &self.gbox);
        }
    }
}
