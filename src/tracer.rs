//! [`VectorTracer`] backed by `vtracer`.

use vtracer::{ColorImage, Config, convert};

use crate::error::BoxError;
use crate::pipeline::VectorTracer;
use crate::raster::RasterImage;

/// Palette size the tracer quantizes logos down to.
pub const DEFAULT_PALETTE_COLORS: u32 = 16;

/// Patches smaller than this many pixels are dropped.
pub const DEFAULT_FILTER_SPECKLE: usize = 8;

/// Traces logos into color SVG with settings tuned for flat artwork.
#[derive(Debug, Clone)]
pub struct VtracerTracer {
    filter_speckle: usize,
    palette_colors: u32,
}

impl Default for VtracerTracer {
    fn default() -> Self {
        Self {
            filter_speckle: DEFAULT_FILTER_SPECKLE,
            palette_colors: DEFAULT_PALETTE_COLORS,
        }
    }
}

impl VtracerTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter_speckle(mut self, filter_speckle: usize) -> Self {
        self.filter_speckle = filter_speckle;
        self
    }

    pub fn with_palette_colors(mut self, palette_colors: u32) -> Self {
        self.palette_colors = palette_colors.max(2);
        self
    }

    /// Significant bits kept per channel, clamped to vtracer's 1..=8.
    fn color_precision(&self) -> i32 {
        self.palette_colors.ilog2().clamp(1, 8) as i32
    }

    fn config(&self) -> Config {
        Config {
            filter_speckle: self.filter_speckle,
            color_precision: self.color_precision(),
            ..Config::default()
        }
    }
}

impl VectorTracer for VtracerTracer {
    fn trace(&self, image: &RasterImage) -> Result<String, BoxError> {
        let (width, height) = image.as_rgba().dimensions();
        let img = ColorImage {
            pixels: image.as_rgba().as_raw().clone(),
            width: width as usize,
            height: height as usize,
        };

        let svg = convert(img, self.config())?;
        Ok(svg.to_string())
    }
}
