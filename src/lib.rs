//! iconpack-renderer: turn a single logo into platform icon packs
//!
//! This crate trims a logo to its visible content, composes it onto a padded,
//! optionally rounded and filled square canvas, and resamples that master
//! composite into every size a set of platform presets asks for.
//!
//! # Example
//!
//! ```
//! use iconpack_renderer::{
//!     Background, IconSetGenerator, PresetCatalog, PresetSelection, ProcessorConfig, RasterImage,
//! };
//! use image::{Rgba, RgbaImage};
//!
//! let logo = RasterImage::new(RgbaImage::from_pixel(300, 120, Rgba([240, 80, 20, 255])))?;
//!
//! let config = ProcessorConfig::new(512)
//!     .with_padding(0.1)
//!     .with_border_radius(0.2)
//!     .with_background(Background::rgb(255, 255, 255));
//!
//! let assets = IconSetGenerator::default().generate(
//!     &logo,
//!     &config,
//!     &PresetCatalog::builtin(),
//!     &PresetSelection::from_ids(["web"]),
//! )?;
//!
//! let paths: Vec<_> = assets.iter().map(|a| a.path.as_str()).collect();
//! assert_eq!(
//!     paths,
//!     ["web-assets/icon-16.png", "web-assets/icon-32.png", "web-assets/icon-192.png", "web-assets/icon-512.png"],
//! );
//! # Ok::<(), iconpack_renderer::IconError>(())
//! ```
//!
//! # Full pipeline
//!
//! For decoding, optional background removal and SVG tracing, use
//! [`IconPackPipeline`] and write the result through an [`AssetSink`]:
//!
//! ```no_run
//! use iconpack_renderer::{
//!     AssetSink, DirectorySink, IconPackPipeline, PresetSelection, ProcessorConfig,
//! };
//!
//! let bytes = std::fs::read("logo.png")?;
//! let assets = IconPackPipeline::default().run(
//!     &bytes,
//!     &ProcessorConfig::default(),
//!     &PresetSelection::All,
//! )?;
//! DirectorySink::new("icon-pack").write_all(&assets)?;
//! # Ok::<(), iconpack_renderer::IconError>(())
//! ```

mod compositor;
mod config;
mod error;
mod generator;
mod pipeline;
mod preset;
mod raster;
mod resample;
mod sink;
mod surface;
mod trim;

#[cfg(feature = "vtracer")]
mod tracer;
#[cfg(feature = "tsify")]
mod wasm;

pub use compositor::{compose, compute_layout};
pub use config::{Background, MAX_FRACTION, ProcessorConfig};
pub use error::{BoxError, IconError, Result};
pub use generator::{
    GeneratedAsset, IconSetGenerator, MANIFEST_FILE_NAME, MANIFEST_ICON_DIR, icon_path,
    manifest_snippet,
};
pub use pipeline::{BackgroundRemover, IconPackPipeline, SVG_ASSET_PATH, VectorTracer};
pub use preset::{IconPreset, PresetCatalog, PresetSelection};
pub use raster::{BoundingBox, OutputFormat, RasterImage, RectF, SizePx};
pub use resample::{
    DEFAULT_QUALITY, DEFAULT_UNSHARP_AMOUNT, DEFAULT_UNSHARP_RADIUS, DEFAULT_UNSHARP_THRESHOLD,
    MAX_UNSHARP_RADIUS, ResampleOptions, Resampler,
};
pub use sink::{AssetSink, DirectorySink};
pub use surface::RasterSurface;
pub use trim::{find_content_bounds, trim};

#[cfg(feature = "vtracer")]
pub use tracer::{DEFAULT_FILTER_SPECKLE, DEFAULT_PALETTE_COLORS, VtracerTracer};
#[cfg(feature = "tsify")]
pub use wasm::{IconPackRenderer, WasmAsset, compose_preview, generate_icon_pack};
