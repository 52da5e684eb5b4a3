use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use egui::Vec2;
use log::{error, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::{Document, Page, Ruling};
use crate::element::{Drawable, Image, Shape, ShapeKind, ShapeStyle, Stroke, StrokePoint, StrokeStyle};
use crate::error::NotebookResult;
use crate::geometry::RotatedBox;
use crate::id;

/// Quiet interval of the debounced save, in seconds.
pub const SAVE_QUIET_SECS: f64 = 0.8;

/// A keyed blob store holding one serialized document per note.
///
/// This is the engine's only view of the surrounding storage layer; it
/// never interprets any other note metadata.
pub trait NoteStore {
    fn get(&self, note_id: Uuid) -> NotebookResult<Option<String>>;
    fn put(&mut self, note_id: Uuid, content: &str) -> NotebookResult<()>;
}

/// In-memory store used by tests.
#[derive(Debug, Default)]
pub struct MemoryNoteStore {
    notes: std::collections::HashMap<Uuid, String>,
    /// Number of `put` calls, for asserting debounce behavior.
    pub writes: usize,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoteStore for MemoryNoteStore {
    fn get(&self, note_id: Uuid) -> NotebookResult<Option<String>> {
        Ok(self.notes.get(&note_id).cloned())
    }

    fn put(&mut self, note_id: Uuid, content: &str) -> NotebookResult<()> {
        self.writes += 1;
        self.notes.insert(note_id, content.to_owned());
        Ok(())
    }
}

/// File-backed store: one JSON blob per note under a directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileNoteStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileNoteStore {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, note_id: Uuid) -> std::path::PathBuf {
        self.dir.join(format!("{note_id}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl NoteStore for FileNoteStore {
    fn get(&self, note_id: Uuid) -> NotebookResult<Option<String>> {
        let path = self.path(note_id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(path)?))
    }

    fn put(&mut self, note_id: Uuid, content: &str) -> NotebookResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(note_id), content)?;
        Ok(())
    }
}

/// Serialized form of the document graph. Raster caches are stripped and
/// image pixels degrade to their embedded encoded payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentData {
    pub pages: Vec<PageData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageData {
    pub width: f32,
    pub height: f32,
    pub ruling: Ruling,
    pub drawables: Vec<DrawableData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DrawableData {
    Stroke {
        points: Vec<StrokePoint>,
        style: StrokeStyle,
    },
    Shape {
        shape: ShapeKind,
        gbox: RotatedBox,
        style: ShapeStyle,
    },
    Image {
        gbox: RotatedBox,
        /// base64 of the original encoded image bytes.
        payload: String,
    },
}

/// An image restored from persisted content whose pixels still need an
/// async decode before the page cache can include it.
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub page_id: usize,
    pub drawable_id: usize,
    pub payload: Vec<u8>,
}

/// Map the live document to its durable representation.
pub fn to_data(document: &Document) -> DocumentData {
    let pages = document
        .pages()
        .iter()
        .map(|page| PageData {
            width: page.size().x,
            height: page.size().y,
            ruling: page.ruling(),
            drawables: page.drawables().iter().map(drawable_to_data).collect(),
        })
        .collect();
    DocumentData { pages }
}

fn drawable_to_data(drawable: &Drawable) -> DrawableData {
    match drawable {
        Drawable::Stroke(stroke) => DrawableData::Stroke {
            points: stroke.points().to_vec(),
            style: *stroke.style(),
        },
        Drawable::Shape(shape) => DrawableData::Shape {
            shape: shape.kind(),
            gbox: *shape.gbox(),
            style: *shape.style(),
        },
        Drawable::Image(image) => DrawableData::Image {
            gbox: *image.gbox(),
            payload: BASE64.encode(image.payload()),
        },
    }
}

/// Rebuild a live document from its durable representation.
///
/// Pages come back with empty caches; every image yields a [`PendingImage`]
/// decode job whose completion populates the pixels and re-dirties the
/// owning page. Positions are recomputed and the non-empty invariant is
/// restored before returning.
pub fn from_data(data: DocumentData, note_id: Uuid) -> (Document, Vec<PendingImage>) {
    let mut document = Document::empty(note_id);
    let mut pending = Vec::new();

    for page_data in data.pages {
        let mut page = Page::new(Vec2::new(page_data.width, page_data.height), page_data.ruling);
        for drawable in page_data.drawables {
            match drawable {
                DrawableData::Stroke { points, style } => {
                    page.push_drawable(Drawable::Stroke(Stroke::new(id::next_id(), points, style)));
                }
                DrawableData::Shape { shape, gbox, style } => {
                    let mut restored = Shape::new(id::next_id(), shape, gbox.rect, style);
                    restored.set_rotation(gbox.rotation);
                    page.push_drawable(Drawable::Shape(restored));
                }
                DrawableData::Image { gbox, payload } => match BASE64.decode(&payload) {
                    Ok(bytes) => {
                        let mut restored = Image::new(id::next_id(), gbox.rect, bytes.clone());
                        restored.set_rotation(gbox.rotation);
                        let drawable_id = restored.id();
                        page.push_drawable(Drawable::Image(restored));
                        pending.push(PendingImage {
                            page_id: page.id(),
                            drawable_id,
                            payload: bytes,
                        });
                    }
                    Err(err) => {
                        // the rest of the page is still good; only this
                        // image is never realized
                        warn!("dropping image with corrupt payload: {err}");
                    }
                },
            }
        }
        document.push_page(page);
    }

    document.ensure_non_empty();
    document.recalculate_page_positions();
    (document, pending)
}

pub fn serialize_document(document: &Document) -> NotebookResult<String> {
    Ok(serde_json::to_string(&to_data(document))?)
}

/// Load a note, falling back to a single empty page on every failure mode.
///
/// Returns the document, the image decode jobs it needs, and an optional
/// non-blocking status message describing a load failure.
pub fn load_document(
    store: &dyn NoteStore,
    note_id: Uuid,
) -> (Document, Vec<PendingImage>, Option<String>) {
    match store.get(note_id) {
        Ok(Some(content)) if !content.trim().is_empty() => {
            match serde_json::from_str::<DocumentData>(&content) {
                Ok(data) => {
                    let (document, pending) = from_data(data, note_id);
                    (document, pending, None)
                }
                Err(err) => {
                    error!("malformed note content: {err}");
                    (
                        Document::new(note_id),
                        Vec::new(),
                        Some(format!("couldn't read note: {err}")),
                    )
                }
            }
        }
        Ok(_) => (Document::new(note_id), Vec::new(), None),
        Err(err) => {
            error!("failed to load note: {err}");
            (
                Document::new(note_id),
                Vec::new(),
                Some(format!("couldn't load note: {err}")),
            )
        }
    }
}

/// Collapses a burst of mutations into one write after a quiet interval.
///
/// `mark` is called on every mutation and pushes the deadline out;
/// `poll` reports `true` exactly once when the deadline passes. The caller
/// serializes at fire time, so the written content reflects the state
/// after the last mutation of the burst.
#[derive(Debug, Clone)]
pub struct DebouncedSaver {
    quiet_secs: f64,
    due: Option<f64>,
}

impl Default for DebouncedSaver {
    fn default() -> Self {
        Self::new(SAVE_QUIET_SECS)
    }
}

impl DebouncedSaver {
    pub fn new(quiet_secs: f64) -> Self {
        Self {
            quiet_secs,
            due: None,
        }
    }

    pub fn mark(&mut self, now: f64) {
        self.due = Some(now + self.quiet_secs);
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn poll(&mut self, now: f64) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
