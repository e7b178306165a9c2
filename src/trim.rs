//! Auto-trim of transparent margins.
//!
//! A pixel counts as content if its alpha is non-zero. The scan finds the
//! top row first, then narrows every following scan to the rows and columns
//! not yet excluded.

use crate::error::Result;
use crate::raster::{BoundingBox, RasterImage};

/// Finds the tight bounding box of all non-transparent pixels.
///
/// Returns `None` if every pixel is fully transparent.
pub fn find_content_bounds(image: &RasterImage) -> Option<BoundingBox> {
    let width = image.width();
    let height = image.height();
    let row_has_content = |y: u32| (0..width).any(|x| image.alpha(x, y) != 0);

    let top = (0..height).find(|&y| row_has_content(y))?;
    let bottom = (top..height)
        .rev()
        .find(|&y| row_has_content(y))
        .unwrap_or(top);

    let column_has_content = |x: u32| (top..=bottom).any(|y| image.alpha(x, y) != 0);
    let left = (0..width).find(|&x| column_has_content(x)).unwrap_or(0);
    let right = (left..width)
        .rev()
        .find(|&x| column_has_content(x))
        .unwrap_or(left);

    BoundingBox::new(left, top, right, bottom)
}

/// Crops `image` to its content bounds.
///
/// A fully transparent image is returned unchanged, so the result is never
/// zero-sized.
pub fn trim(image: &RasterImage) -> Result<RasterImage> {
    match find_content_bounds(image) {
        Some(bounds) if bounds.size() != image.dimensions() => {
            log::debug!(
                "trimmed {}x{} to {}x{} at ({}, {})",
                image.width(),
                image.height(),
                bounds.width(),
                bounds.height(),
                bounds.left,
                bounds.top
            );
            image.crop(bounds)
        }
        Some(_) => Ok(image.clone()),
        None => {
            log::debug!("image is fully transparent, skipping trim");
            Ok(image.clone())
        }
    }
}
