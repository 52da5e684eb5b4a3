use egui::{Pos2, Rect, Vec2};
use log::{debug, info};
use uuid::Uuid;

use crate::element::{Drawable, Image, Manipulable};
use crate::id;
use crate::raster::{render_page_content, Raster};

/// Vertical gap between stacked pages, in world units.
pub const PAGE_GAP: f32 = 32.0;
pub const DEFAULT_PAGE_WIDTH: f32 = 850.0;
pub const DEFAULT_PAGE_HEIGHT: f32 = 1100.0;

/// Background ruling of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Ruling {
    Blank,
    #[default]
    Lined,
    Grid,
}

/// A page's derived raster cache: the committed content rendered to a
/// page-sized surface. Never serialized; rebuilt by full replay when dirty.
/// The version counter lets the renderer key texture uploads.
#[derive(Debug, Clone)]
pub struct PageCache {
    raster: Raster,
    version: u64,
    dirty: bool,
}

impl PageCache {
    fn new(width: usize, height: usize) -> Self {
        Self {
            raster: Raster::new(width, height),
            version: 0,
            dirty: true,
        }
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// One page of the notebook: its geometry, background ruling, committed
/// drawables (page-local coordinates) and the derived raster cache.
#[derive(Debug, Clone)]
pub struct Page {
    id: usize,
    size: Vec2,
    ruling: Ruling,
    origin: Pos2,
    drawables: Vec<Drawable>,
    cache: PageCache,
}

impl Page {
    pub fn new(size: Vec2, ruling: Ruling) -> Self {
        Self {
            id: id::next_id(),
            size,
            ruling,
            origin: Pos2::ZERO,
            drawables: Vec::new(),
            cache: PageCache::new(size.x as usize, size.y as usize),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn ruling(&self) -> Ruling {
        self.ruling
    }

    pub fn origin(&self) -> Pos2 {
        self.origin
    }

    /// World-space rectangle this page occupies.
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.origin, self.size)
    }

    pub fn contains_world(&self, p: Pos2) -> bool {
        self.rect().contains(p)
    }

    pub fn to_local(&self, world: Pos2) -> Pos2 {
        world - self.origin.to_vec2()
    }

    pub fn to_world(&self, local: Pos2) -> Pos2 {
        local + self.origin.to_vec2()
    }

    pub fn drawables(&self) -> &[Drawable] {
        &self.drawables
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    pub fn mark_dirty(&mut self) {
        self.cache.dirty = true;
    }

    /// Replay the full drawable sequence into the cache if it is dirty.
    /// Returns true when a rebuild happened (the version then advances).
    pub fn rebuild_cache(&mut self) -> bool {
        if !self.cache.dirty {
            return false;
        }
        render_page_content(&mut self.cache.raster, &self.drawables);
        self.cache.dirty = false;
        self.cache.version += 1;
        true
    }

    pub fn resize(&mut self, size: Vec2) {
        self.size = size;
        self.cache = PageCache::new(size.x as usize, size.y as usize);
    }

    /// Append an already page-local drawable. Load path and `commit` both
    /// funnel through here.
    pub(crate) fn push_drawable(&mut self, drawable: Drawable) {
        self.drawables.push(drawable);
        self.cache.dirty = true;
    }

    pub(crate) fn find_image_mut(&mut self, drawable_id: usize) -> Option<&mut Image> {
        self.drawables.iter_mut().find_map(|d| match d {
            Drawable::Image(image) if image.id() == drawable_id => Some(image),
            _ => None,
        })
    }
}

/// Result of a commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { page_id: usize },
    /// The anchor point fell outside every page. A deliberate no-op.
    Miss,
    /// The drawable was degenerate (a stroke with fewer than 2 samples).
    Discarded,
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

/// The ordered page sequence of one note, top to bottom.
///
/// Invariant: non-empty after initialization; tearing the last page
/// immediately replaces it with a fresh one.
#[derive(Debug, Clone)]
pub struct Document {
    note_id: Uuid,
    pages: Vec<Page>,
}

impl Document {
    pub fn new(note_id: Uuid) -> Self {
        let mut doc = Self {
            note_id,
            pages: vec![Page::new(
                Vec2::new(DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT),
                Ruling::default(),
            )],
        };
        doc.recalculate_page_positions();
        doc
    }

    /// An empty shell for the load path; the loader appends pages and then
    /// restores the non-empty invariant itself.
    pub(crate) fn empty(note_id: Uuid) -> Self {
        Self {
            note_id,
            pages: Vec::new(),
        }
    }

    pub fn note_id(&self) -> Uuid {
        self.note_id
    }

    pub(crate) fn push_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Restore the non-empty invariant after a load of empty content.
    pub(crate) fn ensure_non_empty(&mut self) {
        if self.pages.is_empty() {
            self.pages.push(Page::new(
                Vec2::new(DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT),
                Ruling::default(),
            ));
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    pub fn page_by_id_mut(&mut self, page_id: usize) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id() == page_id)
    }

    /// Append a page matching the last page's size and ruling.
    pub fn add_page(&mut self) -> usize {
        let (size, ruling) = self
            .pages
            .last()
            .map(|p| (p.size(), p.ruling()))
            .unwrap_or((
                Vec2::new(DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT),
                Ruling::default(),
            ));
        self.pages.push(Page::new(size, ruling));
        self.recalculate_page_positions();
        info!("added page (total {})", self.pages.len());
        self.pages.len() - 1
    }

    /// Insert a page directly after `index`, matching that page's size and
    /// ruling.
    pub fn insert_page_after(&mut self, index: usize) -> usize {
        let index = index.min(self.pages.len().saturating_sub(1));
        let (size, ruling) = self
            .pages
            .get(index)
            .map(|p| (p.size(), p.ruling()))
            .unwrap_or((
                Vec2::new(DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT),
                Ruling::default(),
            ));
        self.pages.insert(index + 1, Page::new(size, ruling));
        self.recalculate_page_positions();
        index + 1
    }

    /// Resize a page; its cache is recreated at the new dimensions and the
    /// stack below it moves to keep the fixed gap.
    pub fn resize_page(&mut self, index: usize, size: Vec2) {
        if let Some(page) = self.pages.get_mut(index) {
            page.resize(size);
            self.recalculate_page_positions();
        }
    }

    /// Remove a page immediately; there is no undo. Tearing the last page
    /// replaces it with a fresh one to keep the document non-empty.
    pub fn tear_page(&mut self, index: usize) {
        if index >= self.pages.len() {
            return;
        }
        let page = self.pages.remove(index);
        info!("tore page {} ({} drawables)", page.id(), page.drawables().len());
        if self.pages.is_empty() {
            self.pages.push(Page::new(
                Vec2::new(DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT),
                Ruling::default(),
            ));
        }
        self.recalculate_page_positions();
    }

    /// Restack pages: vertical sequence with a fixed gap, horizontally
    /// centered about x = 0. Idempotent; called after every structural
    /// change.
    pub fn recalculate_page_positions(&mut self) {
        let mut y = 0.0;
        for page in &mut self.pages {
            page.origin = Pos2::new(-page.size.x / 2.0, y);
            y += page.size.y + PAGE_GAP;
        }
    }

    /// First page containing the world point, in document order.
    pub fn page_at(&self, world: Pos2) -> Option<usize> {
        self.pages.iter().position(|p| p.contains_world(world))
    }

    /// World-space bottom edge of the last page.
    pub fn bottom(&self) -> f32 {
        self.pages
            .last()
            .map(|p| p.origin.y + p.size.y)
            .unwrap_or(0.0)
    }

    /// Commit a drawable whose geometry is in world coordinates: locate the
    /// owning page from the drawable's anchor, translate into page-local
    /// space, append, and invalidate that page's cache.
    ///
    /// A miss (anchor outside every page) is a silent no-op by design, and
    /// strokes with fewer than 2 samples are dropped.
    pub fn commit(&mut self, drawable: Drawable) -> CommitOutcome {
        if let Drawable::Stroke(stroke) = &drawable {
            if stroke.points().len() < 2 {
                debug!("discarding degenerate stroke ({} points)", stroke.points().len());
                return CommitOutcome::Discarded;
            }
        }
        let anchor = drawable.anchor();
        let Some(index) = self.page_at(anchor) else {
            debug!("commit missed every page at {anchor:?}");
            return CommitOutcome::Miss;
        };
        let page = &mut self.pages[index];
        let mut drawable = drawable;
        drawable.translate(-page.origin.to_vec2());
        page.push_drawable(drawable);
        CommitOutcome::Committed { page_id: page.id() }
    }
}
