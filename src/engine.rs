use egui::{Pos2, Rect, Vec2};
use log::{error, info, warn};
use uuid::Uuid;

use crate::decoder::{DecodeTarget, ImageDecoder};
use crate::document::{CommitOutcome, Document};
use crate::element::{Drawable, Image};
use crate::geometry::Viewport;
use crate::guide::Guide;
use crate::id;
use crate::persistence::{self, DebouncedSaver, NoteStore, PendingImage};
use crate::tool::{
    ManipulateTarget, ManipulateTool, PointerInput, ToolCtx, ToolStateMachine, ToolType,
};
use crate::util::time;

/// Width a newly imported image is placed at, in world units; height keeps
/// the decoded aspect ratio.
pub const DEFAULT_IMAGE_WIDTH: f32 = 300.0;
/// When plain scrolling brings the last page's bottom within this many
/// screen pixels of the viewport edge, a page is auto-appended.
const AUTO_APPEND_MARGIN: f32 = 300.0;

/// A non-blocking notice shown in the chrome; never interrupts editing.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub error: bool,
}

/// The notebook canvas engine: exclusive owner of one document, its
/// viewport, the tool state machine, and the transient editing state
/// (active guide, floating object, pending decodes, debounced saves).
///
/// All engine logic runs on one cooperative thread; the app shell feeds it
/// pointer lifecycle events and calls [`CanvasEngine::tick`] once per
/// frame to drain decode completions and fire due saves.
pub struct CanvasEngine {
    document: Document,
    pub viewport: Viewport,
    tools: ToolStateMachine,
    guide: Option<Guide>,
    floating: Option<Drawable>,
    saver: DebouncedSaver,
    store: Box<dyn NoteStore>,
    decoder: ImageDecoder,
    status: Option<StatusMessage>,
    view_rect: Rect,
}

impl CanvasEngine {
    /// Load the note from the store, falling back to a fresh single-page
    /// document on any failure, and schedule decodes for restored images.
    pub fn load(store: Box<dyn NoteStore>, note_id: Uuid) -> Self {
        let (document, pending, load_error) = persistence::load_document(store.as_ref(), note_id);
        let decoder = ImageDecoder::new();
        for PendingImage {
            page_id,
            drawable_id,
            payload,
        } in pending
        {
            decoder.submit(
                DecodeTarget::Placed {
                    page_id,
                    drawable_id,
                },
                payload,
            );
        }
        info!(
            "loaded note {note_id} ({} pages)",
            document.pages().len()
        );
        Self {
            document,
            viewport: Viewport::default(),
            tools: ToolStateMachine::new(),
            guide: None,
            floating: None,
            saver: DebouncedSaver::default(),
            store,
            decoder,
            status: load_error.map(|text| StatusMessage { text, error: true }),
            view_rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(1200.0, 800.0)),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn tools(&self) -> &ToolStateMachine {
        &self.tools
    }

    pub fn active_tool_mut(&mut self) -> &mut ToolType {
        self.tools.active_mut()
    }

    pub fn guide(&self) -> Option<&Guide> {
        self.guide.as_ref()
    }

    pub fn floating(&self) -> Option<&Drawable> {
        self.floating.as_ref()
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    /// Screen rectangle of the canvas panel; the app updates this every
    /// frame so imports center correctly and auto-append can see the edge.
    pub fn set_view_rect(&mut self, rect: Rect) {
        self.view_rect = rect;
    }

    // --- tool dispatch ---------------------------------------------------

    pub fn set_tool(&mut self, next: ToolType) {
        let mut mutated = false;
        let mut requested = None;
        let mut ctx = ToolCtx {
            document: &mut self.document,
            viewport: &mut self.viewport,
            guide: &mut self.guide,
            floating: &mut self.floating,
            mutated: &mut mutated,
            requested: &mut requested,
        };
        self.tools.set_tool(&mut ctx, next);
        if mutated {
            self.saver.mark(time::current_time_secs());
        }
    }

    /// Toggle the given guide on, or off when it is already active.
    pub fn toggle_guide(&mut self, make: impl FnOnce(Pos2) -> Guide) {
        if self.guide.take().is_none() {
            let center = self.viewport.to_world(self.view_rect.center());
            self.guide = Some(make(center));
        }
    }

    pub fn pointer_down(&mut self, screen: Pos2, pressure: Option<f32>) {
        self.dispatch(screen, pressure, DispatchPhase::Down);
    }

    pub fn pointer_move(&mut self, screen: Pos2, pressure: Option<f32>) {
        self.dispatch(screen, pressure, DispatchPhase::Move);
    }

    /// Pointer up or leave; always treated as gesture end so no handler is
    /// left permanently armed.
    pub fn pointer_up(&mut self, screen: Pos2, pressure: Option<f32>) {
        self.dispatch(screen, pressure, DispatchPhase::Up);
    }

    fn dispatch(&mut self, screen: Pos2, pressure: Option<f32>, phase: DispatchPhase) {
        let world = self.viewport.to_world(screen);
        let input = PointerInput {
            world,
            pressure,
        };
        let mut mutated = false;
        let mut requested = None;
        let mut ctx = ToolCtx {
            document: &mut self.document,
            viewport: &mut self.viewport,
            guide: &mut self.guide,
            floating: &mut self.floating,
            mutated: &mut mutated,
            requested: &mut requested,
        };
        match phase {
            DispatchPhase::Down => self.tools.pointer_down(&mut ctx, &input),
            DispatchPhase::Move => self.tools.pointer_move(&mut ctx, &input),
            DispatchPhase::Up => self.tools.pointer_up(&mut ctx, &input),
        }
        if mutated {
            self.saver.mark(time::current_time_secs());
        }
    }

    // --- floating object -------------------------------------------------

    /// Explicitly commit the floating object into the document. A miss
    /// (center outside every page) silently drops it, by design.
    pub fn commit_floating(&mut self) {
        let Some(drawable) = self.floating.take() else {
            return;
        };
        match self.document.commit(drawable) {
            CommitOutcome::Committed { page_id } => {
                info!("placed floating object on page {page_id}");
                self.saver.mark(time::current_time_secs());
            }
            CommitOutcome::Miss => info!("floating object missed every page; dropped"),
            CommitOutcome::Discarded => {}
        }
        self.set_tool(ToolType::default());
    }

    /// Discard the floating object without committing it.
    pub fn drop_floating(&mut self) {
        if self.floating.take().is_some() {
            self.set_tool(ToolType::default());
        }
    }

    // --- viewport gestures -----------------------------------------------

    /// The dedicated pan button: always pans, regardless of active tool.
    pub fn pan_by(&mut self, screen_delta: Vec2) {
        self.viewport.pan_by(screen_delta);
    }

    pub fn zoom_about(&mut self, cursor: Pos2, factor: f32) {
        self.viewport.zoom_about(cursor, factor);
    }

    /// Plain scroll: vertical pan, appending a page when the end of the
    /// document approaches the viewport edge.
    pub fn scroll(&mut self, delta: Vec2) {
        self.viewport.pan_by(Vec2::new(0.0, delta.y));
        if delta.y < 0.0 {
            let bottom = self
                .viewport
                .to_screen(Pos2::new(0.0, self.document.bottom()))
                .y;
            if bottom < self.view_rect.max.y + AUTO_APPEND_MARGIN {
                self.document.add_page();
                self.saver.mark(time::current_time_secs());
            }
        }
    }

    // --- structural operations -------------------------------------------

    pub fn add_page(&mut self) {
        self.document.add_page();
        self.saver.mark(time::current_time_secs());
    }

    pub fn insert_page_after(&mut self, index: usize) {
        self.document.insert_page_after(index);
        self.saver.mark(time::current_time_secs());
    }

    pub fn tear_page(&mut self, index: usize) {
        self.document.tear_page(index);
        self.saver.mark(time::current_time_secs());
    }

    // --- imports ----------------------------------------------------------

    /// Hand raw encoded image bytes to the async decoder; the decoded
    /// result becomes the floating object on a later tick.
    pub fn import_image(&mut self, bytes: Vec<u8>) {
        self.decoder.submit(DecodeTarget::Floating, bytes);
    }

    // --- per-frame upkeep -------------------------------------------------

    pub fn tick(&mut self) {
        self.tick_at(time::current_time_secs());
    }

    /// Drain decode completions and fire a due save. Takes the clock as a
    /// parameter so the debounce window is testable.
    pub fn tick_at(&mut self, now: f64) {
        for result in self.decoder.poll() {
            match result.outcome {
                Ok(pixels) => match result.target {
                    DecodeTarget::Floating => {
                        let aspect = pixels.height as f32 / pixels.width.max(1) as f32;
                        let size = Vec2::new(DEFAULT_IMAGE_WIDTH, DEFAULT_IMAGE_WIDTH * aspect);
                        let center = self.viewport.to_world(self.view_rect.center());
                        let mut image =
                            Image::new(id::next_id(), Rect::from_center_size(center, size), result.payload);
                        image.set_pixels(pixels);
                        self.floating = Some(Drawable::Image(image));
                        // imported images start adjustable, like defined shapes
                        self.set_tool(ToolType::Manipulate(ManipulateTool::new(
                            ManipulateTarget::Floating,
                        )));
                    }
                    DecodeTarget::Placed {
                        page_id,
                        drawable_id,
                    } => {
                        if let Some(page) = self.document.page_by_id_mut(page_id) {
                            let found = page
                                .find_image_mut(drawable_id)
                                .map(|image| image.set_pixels(pixels))
                                .is_some();
                            if found {
                                page.mark_dirty();
                            }
                        }
                    }
                },
                // the image is simply never realized; nothing else is lost
                Err(err) => warn!("image decode failed: {err}"),
            }
        }

        if self.saver.poll(now) {
            self.save_now(now);
        }
    }

    fn save_now(&mut self, now: f64) {
        match persistence::serialize_document(&self.document) {
            Ok(json) => match self.store.put(self.document.note_id(), &json) {
                Ok(()) => {
                    if self.status.as_ref().is_some_and(|s| s.error) {
                        self.status = None;
                    }
                }
                Err(err) => {
                    error!("save failed: {err}");
                    self.status = Some(StatusMessage {
                        text: format!("save failed: {err}"),
                        error: true,
                    });
                    // committed content must survive transient I/O errors:
                    // stay armed and retry after another quiet period
                    self.saver.mark(now);
                }
            },
            Err(err) => {
                error!("serialize failed: {err}");
                self.status = Some(StatusMessage {
                    text: format!("save failed: {err}"),
                    error: true,
                });
            }
        }
    }

    /// True when a mutation is waiting for its quiet interval to elapse.
    pub fn save_pending(&self) -> bool {
        self.saver.is_pending()
    }

    /// Composite one frame. Lives on the engine so the renderer can borrow
    /// the document, tools and overlay state together.
    pub fn render(&mut self, renderer: &mut crate::renderer::Renderer, painter: &egui::Painter) {
        renderer.render(
            painter,
            &mut self.document,
            &self.viewport,
            &self.tools,
            self.floating.as_ref(),
            self.guide.as_ref(),
        );
    }
}

enum DispatchPhase {
    Down,
    Move,
    Up,
}

/// Allow tests to share a store with the engine on the single engine
/// thread.
impl<S: NoteStore> NoteStore for std::rc::Rc<std::cell::RefCell<S>> {
    fn get(&self, note_id: Uuid) -> crate::error::NotebookResult<Option<String>> {
        self.borrow().get(note_id)
    }

    fn put(&mut self, note_id: Uuid, content: &str) -> crate::error::NotebookResult<()> {
        self.borrow_mut().put(note_id, content)
    }
}
