use thiserror::Error;

/// Errors surfaced by the persistence adapter and the image pipeline.
///
/// None of these are fatal to the engine: load failures fall back to a
/// fresh single-page document, save failures leave the saver armed, and
/// decode failures simply never realize the image.
#[derive(Debug, Error)]
pub enum NotebookError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("malformed document content: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("image payload error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NotebookResult<T> = Result<T, NotebookError>;
