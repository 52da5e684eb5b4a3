use egui::{Color32, ColorImage, Pos2};

use crate::document::Ruling;
use crate::element::{DecodedImage, Drawable};
use crate::geometry::{self, RotatedBox};

/// Spacing of ruling lines on lined and grid pages, in page units.
pub const RULING_SPACING: f32 = 40.0;
/// Top margin before the first line of a lined page.
pub const RULING_TOP_MARGIN: f32 = 80.0;

pub const LINED_COLOR: Color32 = Color32::from_rgb(170, 195, 225);
pub const GRID_COLOR: Color32 = Color32::from_rgb(205, 210, 220);

/// A CPU-side RGBA8 surface with straight (unpremultiplied) alpha.
///
/// Pages keep one of these as their committed-content cache: transparent
/// background, rebuilt by replaying the full drawable sequence whenever the
/// page is invalidated. Erasers subtract alpha instead of painting over.
#[derive(Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Raster {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn fill(&mut self, color: Color32) {
        let rgba = color.to_array();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.width + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        self.pixels[(y * self.width + x) * 4 + 3]
    }

    pub fn to_color_image(&self) -> ColorImage {
        ColorImage::from_rgba_unmultiplied([self.width, self.height], &self.pixels)
    }

    /// Source-over blend of `color` at pixel coverage `alpha` in [0, 1].
    fn blend_px(&mut self, x: usize, y: usize, color: [f32; 3], alpha: f32) {
        let i = (y * self.width + x) * 4;
        let da = self.pixels[i + 3] as f32 / 255.0;
        let sa = alpha.clamp(0.0, 1.0);
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return;
        }
        for c in 0..3 {
            let dc = self.pixels[i + c] as f32 / 255.0;
            let out = (color[c] * sa + dc * da * (1.0 - sa)) / out_a;
            self.pixels[i + c] = (out * 255.0).round() as u8;
        }
        self.pixels[i + 3] = (out_a * 255.0).round() as u8;
    }

    /// Subtract coverage from the existing alpha; the eraser blend.
    fn erase_px(&mut self, x: usize, y: usize, coverage: f32) {
        let i = (y * self.width + x) * 4 + 3;
        let da = self.pixels[i] as f32 / 255.0;
        self.pixels[i] = ((da * (1.0 - coverage.clamp(0.0, 1.0))) * 255.0).round() as u8;
    }

    /// Stamp one round-capped segment with linearly interpolated width.
    ///
    /// Coverage is distance-based with a half-pixel feather, which yields
    /// the round caps and joins without special-casing the endpoints.
    pub fn stamp_segment(
        &mut self,
        a: Pos2,
        b: Pos2,
        width_a: f32,
        width_b: f32,
        color: Color32,
        opacity: f32,
        erase: bool,
    ) {
        let max_half = width_a.max(width_b) / 2.0 + 1.0;
        let min_x = ((a.x.min(b.x) - max_half).floor().max(0.0)) as usize;
        let min_y = ((a.y.min(b.y) - max_half).floor().max(0.0)) as usize;
        let max_x = ((a.x.max(b.x) + max_half).ceil()).min(self.width as f32) as usize;
        let max_y = ((a.y.max(b.y) + max_half).ceil()).min(self.height as f32) as usize;
        if min_x >= max_x || min_y >= max_y {
            return;
        }

        let seg = b - a;
        let len_sq = seg.length_sq();
        let rgb = [
            color.r() as f32 / 255.0,
            color.g() as f32 / 255.0,
            color.b() as f32 / 255.0,
        ];
        let color_alpha = color.a() as f32 / 255.0;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 {
                    (((p - a).x * seg.x + (p - a).y * seg.y) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let closest = a + seg * t;
                let dist = p.distance(closest);
                let half = (width_a + (width_b - width_a) * t) / 2.0;
                let coverage = (half + 0.5 - dist).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                if erase {
                    self.erase_px(x, y, coverage * opacity);
                } else {
                    self.blend_px(x, y, rgb, coverage * opacity * color_alpha);
                }
            }
        }
    }

    /// Blit decoded pixels into a rotated box by inverse-mapping each
    /// destination pixel into the source (nearest sampling).
    pub fn blit_rotated(&mut self, image: &DecodedImage, gbox: &RotatedBox) {
        if image.width == 0 || image.height == 0 {
            return;
        }
        let bounds = gbox.bounding_rect();
        let center = gbox.center();
        let rect = gbox.rect;
        let min_x = (bounds.min.x.floor().max(0.0)) as usize;
        let min_y = (bounds.min.y.floor().max(0.0)) as usize;
        let max_x = (bounds.max.x.ceil()).min(self.width as f32).max(0.0) as usize;
        let max_y = (bounds.max.y.ceil()).min(self.height as f32).max(0.0) as usize;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                let local = geometry::rotate_about(p, center, -gbox.rotation);
                if !rect.contains(local) {
                    continue;
                }
                let u = ((local.x - rect.min.x) / rect.width() * image.width as f32) as usize;
                let v = ((local.y - rect.min.y) / rect.height() * image.height as f32) as usize;
                let src = image.sample(u.min(image.width - 1), v.min(image.height - 1));
                let rgb = [
                    src[0] as f32 / 255.0,
                    src[1] as f32 / 255.0,
                    src[2] as f32 / 255.0,
                ];
                self.blend_px(x, y, rgb, src[3] as f32 / 255.0);
            }
        }
    }

    /// Source-over composite another surface of the same size on top.
    pub fn composite_over(&mut self, top: &Raster) {
        debug_assert_eq!((self.width, self.height), (top.width, top.height));
        for y in 0..self.height.min(top.height) {
            for x in 0..self.width.min(top.width) {
                let src = top.pixel(x, y);
                let rgb = [
                    src[0] as f32 / 255.0,
                    src[1] as f32 / 255.0,
                    src[2] as f32 / 255.0,
                ];
                self.blend_px(x, y, rgb, src[3] as f32 / 255.0);
            }
        }
    }

    /// Paint a page background ruling. Used when flattening for export;
    /// the interactive renderer draws rulings as vector lines instead.
    pub fn paint_ruling(&mut self, ruling: Ruling) {
        match ruling {
            Ruling::Blank => {}
            Ruling::Lined => {
                let mut y = RULING_TOP_MARGIN;
                while (y as usize) < self.height {
                    self.paint_hline(y as usize, LINED_COLOR);
                    y += RULING_SPACING;
                }
            }
            Ruling::Grid => {
                let mut y = RULING_SPACING;
                while (y as usize) < self.height {
                    self.paint_hline(y as usize, GRID_COLOR);
                    y += RULING_SPACING;
                }
                let mut x = RULING_SPACING;
                while (x as usize) < self.width {
                    self.paint_vline(x as usize, GRID_COLOR);
                    x += RULING_SPACING;
                }
            }
        }
    }

    fn paint_hline(&mut self, y: usize, color: Color32) {
        let rgba = color.to_array();
        for x in 0..self.width {
            let i = (y * self.width + x) * 4;
            self.pixels[i..i + 4].copy_from_slice(&rgba);
        }
    }

    fn paint_vline(&mut self, x: usize, color: Color32) {
        let rgba = color.to_array();
        for y in 0..self.height {
            let i = (y * self.width + x) * 4;
            self.pixels[i..i + 4].copy_from_slice(&rgba);
        }
    }
}

/// Replay one drawable onto a page surface (page-local coordinates).
pub fn render_drawable(raster: &mut Raster, drawable: &Drawable) {
    match drawable {
        Drawable::Stroke(stroke) => {
            let style = *stroke.style();
            let erase = style.kind.is_eraser();
            for pair in stroke.points().windows(2) {
                let (width_a, width_b) = if style.kind.is_pressure_sensitive() {
                    (
                        style.thickness * pair[0].pressure.max(0.05),
                        style.thickness * pair[1].pressure.max(0.05),
                    )
                } else {
                    (style.thickness, style.thickness)
                };
                raster.stamp_segment(
                    pair[0].pos,
                    pair[1].pos,
                    width_a,
                    width_b,
                    style.color,
                    style.opacity,
                    erase,
                );
            }
        }
        Drawable::Shape(shape) => {
            let outline = shape.outline();
            let style = *shape.style();
            for i in 0..outline.len() {
                let a = outline[i];
                let b = outline[(i + 1) % outline.len()];
                raster.stamp_segment(a, b, style.thickness, style.thickness, style.color, 1.0, false);
            }
        }
        Drawable::Image(image) => {
            if let Some(pixels) = image.pixels() {
                raster.blit_rotated(pixels, image.gbox());
            }
        }
    }
}

/// Full-replay rebuild of a page surface from its committed sequence.
pub fn render_page_content(raster: &mut Raster, drawables: &[Drawable]) {
    raster.clear();
    for drawable in drawables {
        render_drawable(raster, drawable);
    }
}
