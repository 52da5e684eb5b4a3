#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod decoder;
pub mod document;
pub mod element;
pub mod engine;
pub mod error;
pub mod export;
pub mod geometry;
pub mod guide;
pub mod id;
pub mod persistence;
pub mod raster;
pub mod renderer;
pub mod tool;
pub mod util;

pub use app::NotebookApp;
pub use document::{CommitOutcome, Document, Page, Ruling};
pub use element::{Drawable, Manipulable};
pub use engine::CanvasEngine;
pub use error::{NotebookError, NotebookResult};
pub use geometry::{HandleId, RotatedBox, Viewport};
pub use guide::Guide;
pub use persistence::{DebouncedSaver, NoteStore};
pub use renderer::Renderer;
pub use tool::{Tool, ToolStateMachine, ToolType};
