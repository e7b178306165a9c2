//! Raster image types shared by every stage of the pipeline.
//!
//! A [`RasterImage`] is an immutable RGBA8 buffer. Every transform in this
//! crate (trim, compose, resample) takes one by reference and produces a new
//! one; nothing downstream mutates a buffer it did not create.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{IconError, Result};

/// A 2D size in pixel units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizePx {
    pub width: u32,
    pub height: u32,
}

impl SizePx {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if width equals height.
    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Tight content box of an image, in inclusive pixel coordinates.
///
/// `left <= right` and `top <= bottom` always hold, and all four edges lie
/// inside the image the box was computed from. A fully transparent image has
/// no bounding box at all (see [`find_content_bounds`](crate::find_content_bounds)).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    /// Creates a box from inclusive edges.
    ///
    /// Returns `None` if the edges are inverted.
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Option<Self> {
        (left <= right && top <= bottom).then_some(Self {
            left,
            top,
            right,
            bottom,
        })
    }

    /// The box covering an entire `width` x `height` image.
    ///
    /// Returns `None` for a zero-sized image.
    pub fn full(width: u32, height: u32) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        Self::new(0, 0, width - 1, height - 1)
    }

    /// Number of columns covered (inclusive span).
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    /// Number of rows covered (inclusive span).
    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    pub fn size(&self) -> SizePx {
        SizePx::new(self.width(), self.height())
    }
}

/// A rectangle in floating-point canvas coordinates.
///
/// Used for destination rectangles, which are generally not pixel aligned.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RectF {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl RectF {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True if the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// Encoding used for generated raster assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub enum OutputFormat {
    /// Lossless PNG. Ignores the quality setting.
    #[default]
    Png,
    /// Baseline JPEG. Alpha is flattened onto white.
    Jpeg,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    /// True if the format honours a quality knob.
    pub fn supports_quality(&self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

/// An immutable, non-empty RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    data: RgbaImage,
}

impl RasterImage {
    /// Wraps an RGBA buffer.
    ///
    /// Fails with [`IconError::Allocation`] if either dimension is zero.
    pub fn new(data: RgbaImage) -> Result<Self> {
        if data.width() == 0 || data.height() == 0 {
            return Err(IconError::allocation(format!(
                "image must be non-empty, got {}x{}",
                data.width(),
                data.height()
            )));
        }
        Ok(Self { data })
    }

    /// Builds an image from raw row-major RGBA bytes.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        let actual = pixels.len();
        let data = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            IconError::allocation(format!(
                "buffer of {actual} bytes does not fit {width}x{height} RGBA (need {expected})"
            ))
        })?;
        Self::new(data)
    }

    /// Decodes any format supported by the `image` crate.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let decoded =
            image::load_from_memory(bytes).map_err(|e| IconError::Decode(e.to_string()))?;
        Self::new(decoded.to_rgba8()).map_err(|e| IconError::Decode(e.to_string()))
    }

    pub fn width(&self) -> u32 {
        self.data.width()
    }

    pub fn height(&self) -> u32 {
        self.data.height()
    }

    /// Returns the pixel dimensions of the image.
    pub fn dimensions(&self) -> SizePx {
        SizePx::new(self.data.width(), self.data.height())
    }

    /// Borrow the underlying buffer.
    pub fn as_rgba(&self) -> &RgbaImage {
        &self.data
    }

    /// Consumes the image, returning the underlying buffer.
    pub fn into_rgba(self) -> RgbaImage {
        self.data
    }

    /// Alpha value of the pixel at `(x, y)`.
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        self.data.get_pixel(x, y)[3]
    }

    /// Copies the region covered by `bounds` into a new image.
    ///
    /// `bounds` must lie within this image.
    pub fn crop(&self, bounds: BoundingBox) -> Result<Self> {
        if bounds.right >= self.width() || bounds.bottom >= self.height() {
            return Err(IconError::allocation(format!(
                "crop {:?} exceeds {}x{} image",
                bounds,
                self.width(),
                self.height()
            )));
        }
        let cropped = image::imageops::crop_imm(
            &self.data,
            bounds.left,
            bounds.top,
            bounds.width(),
            bounds.height(),
        )
        .to_image();
        Self::new(cropped)
    }

    /// Encodes the image in the given format.
    ///
    /// `quality` is in `0.0..=1.0` and only applies to formats that
    /// support it.
    pub fn encode(&self, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        match format {
            OutputFormat::Png => {
                let encoder = PngEncoder::new_with_quality(
                    &mut bytes,
                    CompressionType::Default,
                    PngFilterType::Adaptive,
                );
                encoder
                    .write_image(
                        self.data.as_raw(),
                        self.width(),
                        self.height(),
                        ExtendedColorType::Rgba8,
                    )
                    .map_err(|e| IconError::encode(format!("PNG: {e}")))?;
            }
            OutputFormat::Jpeg => {
                let flattened = self.flatten_onto_white();
                let encoder = JpegEncoder::new_with_quality(&mut bytes, jpeg_quality(quality));
                encoder
                    .write_image(
                        flattened.as_raw(),
                        self.width(),
                        self.height(),
                        ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| IconError::encode(format!("JPEG: {e}")))?;
            }
        }
        Ok(bytes)
    }

    /// Encodes the image as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        self.encode(OutputFormat::Png, 1.0)
    }

    fn flatten_onto_white(&self) -> RgbImage {
        RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let [r, g, b, a] = self.data.get_pixel(x, y).0;
            let a = a as u32;
            let over = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
            Rgb([over(r), over(g), over(b)])
        })
    }
}

impl TryFrom<RgbaImage> for RasterImage {
    type Error = IconError;

    fn try_from(data: RgbaImage) -> Result<Self> {
        Self::new(data)
    }
}

fn jpeg_quality(quality: f32) -> u8 {
    if !quality.is_finite() {
        return 90;
    }
    (quality.clamp(0.0, 1.0) * 100.0).round().clamp(1.0, 100.0) as u8
}
