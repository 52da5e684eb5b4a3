use std::collections::HashMap;

use egui::{
    Color32, ColorImage, Painter, Pos2, Rect, Stroke as EguiStroke, TextureHandle, TextureOptions,
};

use crate::document::{Document, Ruling};
use crate::element::Drawable;
use crate::geometry::Viewport;
use crate::guide::Guide;
use crate::raster::{GRID_COLOR, LINED_COLOR, RULING_SPACING, RULING_TOP_MARGIN};
use crate::tool::ToolStateMachine;

const CANVAS_BACKGROUND: Color32 = Color32::from_gray(34);
const PAGE_FILL: Color32 = Color32::WHITE;
const PAGE_BORDER: Color32 = Color32::from_gray(120);

/// The layered compositor.
///
/// Bottom to top each frame: page backgrounds, the committed caches, the
/// active tool's live preview, then the floating object and guide overlay.
/// The expensive part, rasterizing a page's committed content, only runs
/// when that page's cache is dirty; texture uploads are keyed by the cache
/// version so an unchanged page re-blits for free across frames and
/// pan/zoom. The overlay layers are redrawn unconditionally, and the loop
/// always requests the next repaint.
pub struct Renderer {
    ctx: egui::Context,
    /// Uploaded page caches, keyed by page id -> (cache version, texture).
    page_textures: HashMap<usize, (u64, TextureHandle)>,
    /// Texture of the floating image, if any, keyed by drawable id.
    floating_texture: Option<(usize, TextureHandle)>,
}

impl Renderer {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::from_context(cc.egui_ctx.clone())
    }

    pub fn from_context(ctx: egui::Context) -> Self {
        Self {
            ctx,
            page_textures: HashMap::new(),
            floating_texture: None,
        }
    }

    /// Composite one frame into `painter`'s clip rect.
    pub fn render(
        &mut self,
        painter: &Painter,
        document: &mut Document,
        viewport: &Viewport,
        tools: &ToolStateMachine,
        floating: Option<&Drawable>,
        guide: Option<&Guide>,
    ) {
        painter.rect_filled(painter.clip_rect(), 0.0, CANVAS_BACKGROUND);

        self.draw_committed(painter, document, viewport);

        // overlay layers: cheap, unconditional
        tools.draw_preview(viewport, painter);
        if let Some(drawable) = floating {
            let texture = self.floating_texture_id(drawable);
            drawable.draw(painter, viewport, texture, true);
        }
        if let Some(guide) = guide {
            guide.draw(painter, viewport, true);
        }

        self.prune(document, floating);

        // the loop never stalls; the dirty flags gate the expensive work
        self.ctx.request_repaint();
    }

    fn draw_committed(&mut self, painter: &Painter, document: &mut Document, viewport: &Viewport) {
        let clip = painter.clip_rect();
        for page in document.pages_mut() {
            let screen_rect = viewport.rect_to_screen(page.rect());
            if !screen_rect.intersects(clip) {
                continue;
            }

            painter.rect_filled(screen_rect, 0.0, PAGE_FILL);
            draw_ruling(painter, screen_rect, page.ruling(), viewport.zoom);
            painter.rect_stroke(screen_rect, 0.0, EguiStroke::new(1.0, PAGE_BORDER));

            if page.rebuild_cache() {
                log::debug!("rebuilt cache for page {}", page.id());
            }
            let version = page.cache().version();
            let up_to_date = self
                .page_textures
                .get(&page.id())
                .is_some_and(|(v, _)| *v == version);
            if !up_to_date {
                let handle = self.ctx.load_texture(
                    format!("page_{}", page.id()),
                    page.cache().raster().to_color_image(),
                    TextureOptions::LINEAR,
                );
                self.page_textures.insert(page.id(), (version, handle));
            }
            if let Some((_, handle)) = self.page_textures.get(&page.id()) {
                painter.image(
                    handle.id(),
                    screen_rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
        }
    }

    /// Texture for the floating image, uploaded lazily once its pixels are
    /// decoded. Non-image drawables have no texture.
    fn floating_texture_id(&mut self, drawable: &Drawable) -> Option<egui::TextureId> {
        let Drawable::Image(image) = drawable else {
            return None;
        };
        if let Some((id, handle)) = &self.floating_texture {
            if *id == image.id() {
                return Some(handle.id());
            }
        }
        let pixels = image.pixels()?;
        let color_image =
            ColorImage::from_rgba_unmultiplied([pixels.width, pixels.height], &pixels.rgba);
        let handle = self.ctx.load_texture(
            format!("floating_{}", image.id()),
            color_image,
            TextureOptions::LINEAR,
        );
        let id = handle.id();
        self.floating_texture = Some((image.id(), handle));
        Some(id)
    }

    /// Drop textures whose page was torn or whose floating object is gone.
    fn prune(&mut self, document: &Document, floating: Option<&Drawable>) {
        let live: std::collections::HashSet<usize> =
            document.pages().iter().map(|p| p.id()).collect();
        self.page_textures.retain(|id, _| live.contains(id));

        let keep = matches!(
            (&self.floating_texture, floating),
            (Some((id, _)), Some(Drawable::Image(image))) if *id == image.id()
        );
        if !keep {
            self.floating_texture = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::element::{Drawable, LineKind, Stroke, StrokePoint, StrokeStyle};
    use crate::tool::ToolStateMachine;
    use uuid::Uuid;

    #[test]
    fn test_render_uploads_and_cleans_page_caches() {
        let ctx = egui::Context::default();
        let mut renderer = Renderer::from_context(ctx.clone());
        let mut document = Document::new(Uuid::new_v4());
        let origin = document.pages()[0].origin();
        let style = StrokeStyle {
            color: Color32::BLACK,
            kind: LineKind::Ballpoint,
            thickness: 4.0,
            opacity: 1.0,
        };
        let points = vec![
            StrokePoint::new(Pos2::new(origin.x + 10.0, 10.0), 1.0),
            StrokePoint::new(Pos2::new(origin.x + 60.0, 40.0), 1.0),
        ];
        document.commit(Drawable::Stroke(Stroke::new(1, points, style)));
        assert!(document.pages()[0].cache().is_dirty());

        let viewport = Viewport::default();
        let tools = ToolStateMachine::new();
        let painter = egui::Painter::new(
            ctx,
            egui::LayerId::background(),
            Rect::from_min_size(Pos2::new(-400.0, 0.0), egui::Vec2::new(800.0, 600.0)),
        );
        renderer.render(&painter, &mut document, &viewport, &tools, None, None);
        assert!(!document.pages()[0].cache().is_dirty());
        assert_eq!(renderer.page_textures.len(), 1);

        // a clean cache re-blits without another upload
        let version = document.pages()[0].cache().version();
        renderer.render(&painter, &mut document, &viewport, &tools, None, None);
        assert_eq!(document.pages()[0].cache().version(), version);
    }
}

/// Vector ruling lines for the interactive view; the raster variant is
/// only used when flattening pages for export.
fn draw_ruling(painter: &Painter, screen_rect: Rect, ruling: Ruling, zoom: f32) {
    let painter = painter.with_clip_rect(screen_rect);
    let spacing = RULING_SPACING * zoom;
    if spacing < 2.0 {
        return;
    }
    match ruling {
        Ruling::Blank => {}
        Ruling::Lined => {
            let stroke = EguiStroke::new(1.0, LINED_COLOR);
            let mut y = screen_rect.min.y + RULING_TOP_MARGIN * zoom;
            while y < screen_rect.max.y {
                painter.line_segment(
                    [
                        Pos2::new(screen_rect.min.x, y),
                        Pos2::new(screen_rect.max.x, y),
                    ],
                    stroke,
                );
                y += spacing;
            }
        }
        Ruling::Grid => {
            let stroke = EguiStroke::new(1.0, GRID_COLOR);
            let mut y = screen_rect.min.y + spacing;
            while y < screen_rect.max.y {
                painter.line_segment(
                    [
                        Pos2::new(screen_rect.min.x, y),
                        Pos2::new(screen_rect.max.x, y),
                    ],
                    stroke,
                );
                y += spacing;
            }
            let mut x = screen_rect.min.x + spacing;
            while x < screen_rect.max.x {
                painter.line_segment(
                    [
                        Pos2::new(x, screen_rect.min.y),
                        Pos2::new(x, screen_rect.max.y),
                    ],
                    stroke,
                );
                x += spacing;
            }
        }
    }
}
