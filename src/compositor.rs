//! Master composite: trimmed logo centered on a padded square canvas.
//!
//! The order of operations is fixed:
//!
//! ```text
//! source ──► trim ──► allocate size×size ──► rounded clip ──► background fill ──► draw logo
//! ```
//!
//! The clip is installed before anything is painted, so the background fill
//! and the logo both end up inside the rounded silhouette.

use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::raster::{RasterImage, RectF, SizePx};
use crate::resample::lanczos;
use crate::surface::RasterSurface;
use crate::trim::trim;

/// Computes where content of size `content` is drawn on a `canvas` x
/// `canvas` square with fractional `padding` on every side.
///
/// The longer side of the content exactly fills the padded area, the shorter
/// side is scaled by the same factor, and the result is centered. The aspect
/// ratio is always preserved.
pub fn compute_layout(content: SizePx, canvas: u32, padding: f32) -> RectF {
    let size = canvas as f32;
    let available = size * (1.0 - padding * 2.0);
    let aspect = content.aspect_ratio();

    let (width, height) = if aspect >= 1.0 {
        (available, available / aspect)
    } else {
        (available * aspect, available)
    };

    RectF::new((size - width) / 2.0, (size - height) / 2.0, width, height)
}

/// Composes `source` into a square master icon as described by `config`.
///
/// Fails with a config error if `config` is invalid.
pub fn compose(source: &RasterImage, config: &ProcessorConfig) -> Result<RasterImage> {
    config.validate()?;

    let trimmed = trim(source)?;
    let layout = compute_layout(trimmed.dimensions(), config.size, config.padding);
    log::debug!(
        "composing {}x{} content into {}px canvas at {:?}",
        trimmed.width(),
        trimmed.height(),
        config.size,
        layout
    );

    let mut surface = RasterSurface::new(config.size, config.size)?;
    if config.border_radius > 0.0 {
        surface = surface.clip_rounded_rect(config.radius_px())?;
    }
    if let Some(color) = config.background_color.color() {
        surface = surface.fill(color);
    }
    if !layout.is_empty() {
        let content = fit_to_layout(&trimmed, layout)?;
        surface = surface.draw_image(&content, layout)?;
    }

    surface.into_image()
}

/// Pre-scales content to the whole-pixel size nearest its layout, so the
/// surface only performs a sub-pixel adjustment instead of a large
/// (aliasing) rescale.
fn fit_to_layout(content: &RasterImage, layout: RectF) -> Result<RasterImage> {
    let width = layout.width.round().max(1.0) as u32;
    let height = layout.height.round().max(1.0) as u32;
    lanczos(content, width, height)
}
