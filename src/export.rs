use egui::{Color32, ColorImage};

use crate::document::{Document, Page};
use crate::raster::Raster;

/// Flatten one page to a bitmap at its native pixel dimensions:
/// white fill, background ruling, then the committed cache on top.
///
/// Rebuilds the cache first if it is dirty, so the export always reflects
/// the current committed content.
pub fn page_bitmap(page: &mut Page) -> ColorImage {
    page.rebuild_cache();
    let mut flat = Raster::new(page.size().x as usize, page.size().y as usize);
    flat.fill(Color32::WHITE);
    flat.paint_ruling(page.ruling());
    flat.composite_over(page.cache().raster());
    flat.to_color_image()
}

/// One flattened bitmap per page, in page order. The document export
/// collaborator assembles these into its multi-page output.
pub fn document_bitmaps(document: &mut Document) -> Vec<ColorImage> {
    document.pages_mut().iter_mut().map(page_bitmap).collect()
}
