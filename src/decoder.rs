use std::sync::mpsc::{channel, Receiver, Sender};

use log::debug;

use crate::element::DecodedImage;

/// Where a finished decode should land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeTarget {
    /// A freshly imported image, to be placed as the floating object.
    Floating,
    /// An image drawable restored from persisted content.
    Placed { page_id: usize, drawable_id: usize },
}

/// A completed decode, drained by the engine's per-frame poll.
pub struct DecodeResult {
    pub target: DecodeTarget,
    /// The original encoded bytes, retained for persistence.
    pub payload: Vec<u8>,
    pub outcome: Result<DecodedImage, String>,
}

/// Image decoding off the engine thread.
///
/// Jobs run on short-lived worker threads and report over an mpsc channel;
/// the engine drains completions cooperatively once per frame, so all
/// document mutation still happens on the single engine thread. On wasm
/// there are no threads and the decode runs inline, which preserves the
/// deferred-completion contract (the result still arrives via the poll).
pub struct ImageDecoder {
    tx: Sender<DecodeResult>,
    rx: Receiver<DecodeResult>,
}

impl Default for ImageDecoder {
    fn default() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }
}

impl ImageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&self, target: DecodeTarget, payload: Vec<u8>) {
        debug!("decoding image payload ({} bytes)", payload.len());
        let tx = self.tx.clone();

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(move || {
            let outcome = decode_payload(&payload);
            let _ = tx.send(DecodeResult {
                target,
                payload,
                outcome,
            });
        });

        #[cfg(target_arch = "wasm32")]
        {
            let outcome = decode_payload(&payload);
            let _ = tx.send(DecodeResult {
                target,
                payload,
                outcome,
            });
        }
    }

    /// Drain all completions that arrived since the last poll.
    pub fn poll(&self) -> Vec<DecodeResult> {
        self.rx.try_iter().collect()
    }
}

/// Decode encoded image bytes to straight RGBA8.
pub fn decode_payload(bytes: &[u8]) -> Result<DecodedImage, String> {
    match image::load_from_memory(bytes) {
        Ok(img) => {
            let rgba = img.to_rgba8();
            Ok(DecodedImage {
                width: rgba.width() as usize,
                height: rgba.height() as usize,
                rgba: rgba.into_raw(),
            })
        }
        Err(err) => Err(err.to_string()),
    }
}
