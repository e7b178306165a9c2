//! Drawing surface backed by `tiny_skia` (re-exported through `resvg`).
//!
//! [`RasterSurface`] makes the clip / fill / draw order explicit: every
//! operation consumes the surface and returns it, and the only clip state is
//! the mask owned by that one surface.
//!
//! # Example
//!
//! ```
//! use iconpack_renderer::RasterSurface;
//! use image::Rgba;
//!
//! let image = RasterSurface::new(64, 64)?
//!     .clip_rounded_rect(16.0)?
//!     .fill(Rgba([255, 0, 0, 255]))
//!     .into_image()?;
//!
//! assert_eq!(image.as_rgba().get_pixel(0, 0)[3], 0);
//! assert_eq!(image.as_rgba().get_pixel(32, 32).0, [255, 0, 0, 255]);
//! # Ok::<(), iconpack_renderer::IconError>(())
//! ```

use image::{Rgba, RgbaImage};
use resvg::tiny_skia::{
    ColorU8, FillRule, FilterQuality, IntSize, Mask, Paint, Path, PathBuilder, Pattern, Pixmap,
    Rect, SpreadMode, Transform,
};

use crate::error::{IconError, Result};
use crate::raster::{BoundingBox, OutputFormat, RasterImage, RectF};

/// Scale factors this close to 1.0 are drawn with bilinear sampling, which
/// reproduces pixel-aligned sources exactly.
const UNIT_SCALE_EPSILON: f32 = 1e-3;

/// A blank RGBA canvas with an optional clip mask.
pub struct RasterSurface {
    pixmap: Pixmap,
    clip: Option<Mask>,
}

impl RasterSurface {
    /// Allocates a fully transparent surface.
    ///
    /// Fails with [`IconError::Allocation`] for zero dimensions or if the
    /// backing buffer cannot be created.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(IconError::allocation(format!(
                "surface must be non-empty, got {width}x{height}"
            )));
        }
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            IconError::allocation(format!("cannot allocate {width}x{height} surface"))
        })?;
        Ok(Self { pixmap, clip: None })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Returns true if a clip mask is active.
    pub fn is_clipped(&self) -> bool {
        self.clip.is_some()
    }

    /// Restricts every subsequent fill and draw to a rounded rectangle
    /// covering the whole surface.
    ///
    /// The corners are quadratic curves whose control points sit on the
    /// surface corners. `radius` is clamped to half the shorter side; a
    /// radius of zero leaves the surface unclipped.
    pub fn clip_rounded_rect(mut self, radius: f32) -> Result<Self> {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let radius = radius.clamp(0.0, w.min(h) / 2.0);
        if radius <= 0.0 {
            return Ok(self);
        }

        let path = rounded_rect_path(w, h, radius)
            .ok_or_else(|| IconError::allocation("cannot build rounded clip path"))?;
        let mut mask = Mask::new(self.width(), self.height())
            .ok_or_else(|| IconError::allocation("cannot allocate clip mask"))?;
        mask.fill_path(&path, FillRule::Winding, true, Transform::identity());

        self.clip = Some(mask);
        Ok(self)
    }

    /// Fills the whole surface with a solid color, subject to the clip.
    pub fn fill(mut self, color: Rgba<u8>) -> Self {
        let [r, g, b, a] = color.0;
        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = true;

        if let Some(rect) = Rect::from_xywh(0.0, 0.0, self.width() as f32, self.height() as f32) {
            self.pixmap
                .fill_rect(rect, &paint, Transform::identity(), self.clip.as_ref());
        }
        self
    }

    /// Draws `image` scaled into `dest` (source-over), subject to the clip.
    ///
    /// An empty destination draws nothing.
    pub fn draw_image(mut self, image: &RasterImage, dest: RectF) -> Result<Self> {
        let Some(rect) = Rect::from_xywh(dest.x, dest.y, dest.width, dest.height) else {
            log::debug!("skipping draw into empty rect {:?}", dest);
            return Ok(self);
        };

        let source = image_to_pixmap(image)?;
        let scale_x = dest.width / image.width() as f32;
        let scale_y = dest.height / image.height() as f32;
        let quality = if (scale_x - 1.0).abs() < UNIT_SCALE_EPSILON
            && (scale_y - 1.0).abs() < UNIT_SCALE_EPSILON
        {
            FilterQuality::Bilinear
        } else {
            FilterQuality::Bicubic
        };

        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.shader = Pattern::new(
            source.as_ref(),
            SpreadMode::Pad,
            quality,
            1.0,
            Transform::from_row(scale_x, 0.0, 0.0, scale_y, dest.x, dest.y),
        );

        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), self.clip.as_ref());
        Ok(self)
    }

    /// Draws the `src` region of `image` scaled into `dest`.
    ///
    /// The region is copied out before drawing, so filtering at its edges
    /// never samples pixels outside `src`. Fails if `src` does not lie within
    /// `image`.
    pub fn draw_image_region(
        self,
        image: &RasterImage,
        src: BoundingBox,
        dest: RectF,
    ) -> Result<Self> {
        if BoundingBox::full(image.width(), image.height()) == Some(src) {
            return self.draw_image(image, dest);
        }
        let region = image.crop(src)?;
        self.draw_image(&region, dest)
    }

    /// Snapshots the surface into a straight-alpha [`RasterImage`].
    pub fn to_image(&self) -> Result<RasterImage> {
        RasterImage::new(pixmap_to_rgba_image(&self.pixmap))
    }

    /// Consumes the surface, returning its pixels.
    pub fn into_image(self) -> Result<RasterImage> {
        self.to_image()
    }

    /// Encodes the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        self.to_image()?.encode(OutputFormat::Png, 1.0)
    }
}

/// Builds the 8-segment rounded rectangle: four edges joined by quadratic
/// corners.
fn rounded_rect_path(w: f32, h: f32, r: f32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(r, 0.0);
    pb.line_to(w - r, 0.0);
    pb.quad_to(w, 0.0, w, r);
    pb.line_to(w, h - r);
    pb.quad_to(w, h, w - r, h);
    pb.line_to(r, h);
    pb.quad_to(0.0, h, 0.0, h - r);
    pb.line_to(0.0, r);
    pb.quad_to(0.0, 0.0, r, 0.0);
    pb.close();
    pb.finish()
}

/// Converts a straight-alpha image into a premultiplied pixmap.
fn image_to_pixmap(image: &RasterImage) -> Result<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())
        .ok_or_else(|| IconError::allocation("invalid pixmap size"))?;

    let mut data = Vec::with_capacity(image.as_rgba().as_raw().len());
    for pixel in image.as_rgba().pixels() {
        let [r, g, b, a] = pixel.0;
        let premultiplied = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[
            premultiplied.red(),
            premultiplied.green(),
            premultiplied.blue(),
            premultiplied.alpha(),
        ]);
    }

    Pixmap::from_vec(data, size)
        .ok_or_else(|| IconError::allocation("cannot build pixmap from image"))
}

/// Converts a tiny_skia Pixmap to an image::RgbaImage.
fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        // tiny_skia stores premultiplied alpha
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }
    img
}
