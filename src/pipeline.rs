//! End-to-end icon pack pipeline with pluggable collaborators.
//!
//! ```text
//! bytes ──► decode ──► [remove background] ──► compose ──► resize per preset
//!                                                  │
//!                                                  └──► [trace] ──► icon.svg
//! ```
//!
//! Background removal and vector tracing are optional and best-effort: a
//! failing collaborator is logged and skipped, never fatal.

use crate::compositor::compose;
use crate::config::ProcessorConfig;
use crate::error::{BoxError, Result};
use crate::generator::{GeneratedAsset, IconSetGenerator};
use crate::preset::{PresetCatalog, PresetSelection};
use crate::raster::RasterImage;

/// Path of the traced vector icon within the pack.
pub const SVG_ASSET_PATH: &str = "icon.svg";

/// Removes the background from a source image.
///
/// The returned image must have the same dimensions as the input.
pub trait BackgroundRemover: Send + Sync {
    fn remove_background(&self, image: &RasterImage) -> std::result::Result<RasterImage, BoxError>;
}

impl<F> BackgroundRemover for F
where
    F: Fn(&RasterImage) -> std::result::Result<RasterImage, BoxError> + Send + Sync,
{
    fn remove_background(&self, image: &RasterImage) -> std::result::Result<RasterImage, BoxError> {
        self(image)
    }
}

/// Converts a raster image into SVG markup.
pub trait VectorTracer: Send + Sync {
    fn trace(&self, image: &RasterImage) -> std::result::Result<String, BoxError>;
}

impl<F> VectorTracer for F
where
    F: Fn(&RasterImage) -> std::result::Result<String, BoxError> + Send + Sync,
{
    fn trace(&self, image: &RasterImage) -> std::result::Result<String, BoxError> {
        self(image)
    }
}

/// Orchestrates decoding, optional background removal, generation and
/// optional tracing.
///
/// # Example
///
/// ```
/// use iconpack_renderer::{IconPackPipeline, PresetSelection, ProcessorConfig, RasterImage};
/// use image::{Rgba, RgbaImage};
///
/// let png = RasterImage::new(RgbaImage::from_pixel(40, 40, Rgba([0, 90, 200, 255])))?.to_png()?;
///
/// let pipeline = IconPackPipeline::default()
///     .with_tracer(|_: &RasterImage| Ok::<_, iconpack_renderer::BoxError>("<svg/>".to_string()));
/// let assets = pipeline.run(&png, &ProcessorConfig::new(64), &PresetSelection::from_ids(["web"]))?;
///
/// assert_eq!(assets.last().map(|a| a.path.as_str()), Some("icon.svg"));
/// # Ok::<(), iconpack_renderer::IconError>(())
/// ```
#[derive(Default)]
pub struct IconPackPipeline {
    generator: IconSetGenerator,
    catalog: PresetCatalog,
    remover: Option<Box<dyn BackgroundRemover>>,
    tracer: Option<Box<dyn VectorTracer>>,
}

impl IconPackPipeline {
    pub fn new(generator: IconSetGenerator, catalog: PresetCatalog) -> Self {
        Self {
            generator,
            catalog,
            remover: None,
            tracer: None,
        }
    }

    pub fn with_background_remover(mut self, remover: impl BackgroundRemover + 'static) -> Self {
        self.remover = Some(Box::new(remover));
        self
    }

    pub fn with_tracer(mut self, tracer: impl VectorTracer + 'static) -> Self {
        self.tracer = Some(Box::new(tracer));
        self
    }

    pub fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    pub fn generator(&self) -> &IconSetGenerator {
        &self.generator
    }

    /// Decodes `bytes` and runs the pipeline on the result.
    pub fn run(
        &self,
        bytes: &[u8],
        config: &ProcessorConfig,
        selection: &PresetSelection,
    ) -> Result<Vec<GeneratedAsset>> {
        let source = RasterImage::decode(bytes)?;
        self.run_image(&source, config, selection)
    }

    /// Runs the pipeline on an already decoded image.
    pub fn run_image(
        &self,
        source: &RasterImage,
        config: &ProcessorConfig,
        selection: &PresetSelection,
    ) -> Result<Vec<GeneratedAsset>> {
        config.validate()?;
        self.catalog.select(selection)?;

        let cleaned = self.remove_background(source);
        let source = cleaned.as_ref().unwrap_or(source);

        let master = compose(source, config)?;
        let mut assets = self
            .generator
            .generate_from_master(&master, &self.catalog, selection)?;

        if let Some(svg) = self.trace(&master) {
            assets.push(GeneratedAsset::new(SVG_ASSET_PATH, svg));
        }
        Ok(assets)
    }

    fn remove_background(&self, source: &RasterImage) -> Option<RasterImage> {
        let remover = self.remover.as_ref()?;
        match remover.remove_background(source) {
            Ok(image) if image.dimensions() == source.dimensions() => Some(image),
            Ok(image) => {
                log::warn!(
                    "background removal changed dimensions {}x{} -> {}x{}, using original",
                    source.width(),
                    source.height(),
                    image.width(),
                    image.height()
                );
                None
            }
            Err(e) => {
                log::warn!("background removal failed, using original: {e}");
                None
            }
        }
    }

    fn trace(&self, master: &RasterImage) -> Option<String> {
        let tracer = self.tracer.as_ref()?;
        match tracer.trace(master) {
            Ok(svg) if svg.trim().is_empty() => {
                log::warn!("vector tracer returned no markup, skipping {SVG_ASSET_PATH}");
                None
            }
            Ok(svg) => Some(svg),
            Err(e) => {
                log::warn!("vector tracing failed, skipping {SVG_ASSET_PATH}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IconError;
    use image::{Rgba, RgbaImage};

    fn source_png() -> Vec<u8> {
        let mut img = RgbaImage::from_pixel(60, 40, Rgba([255, 255, 255, 255]));
        for y in 10..30 {
            for x in 10..50 {
                img.put_pixel(x, y, Rgba([200, 0, 0, 255]));
            }
        }
        RasterImage::new(img).unwrap().to_png().unwrap()
    }

    fn config() -> ProcessorConfig {
        ProcessorConfig::new(64)
    }

    fn web() -> PresetSelection {
        PresetSelection::from_ids(["web"])
    }

    fn paths(assets: &[GeneratedAsset]) -> Vec<&str> {
        assets.iter().map(|a| a.path.as_str()).collect()
    }

    /// Drops pure white pixels.
    fn strip_white(image: &RasterImage) -> std::result::Result<RasterImage, BoxError> {
        let mut rgba = image.as_rgba().clone();
        for p in rgba.pixels_mut() {
            if p.0[..3] == [255, 255, 255] {
                p.0[3] = 0;
            }
        }
        Ok(RasterImage::new(rgba)?)
    }

    #[test]
    fn runs_without_collaborators() {
        let assets = IconPackPipeline::default()
            .run(&source_png(), &config(), &web())
            .unwrap();
        assert_eq!(
            paths(&assets),
            vec![
                "web-assets/icon-16.png",
                "web-assets/icon-32.png",
                "web-assets/icon-192.png",
                "web-assets/icon-512.png",
            ]
        );
    }

    #[test]
    fn background_removal_changes_the_trim() {
        // Reports the master's alpha at (32, 13) through the traced SVG.
        let probe = |pipeline: IconPackPipeline| -> u8 {
            let assets = pipeline
                .with_tracer(|img: &RasterImage| -> std::result::Result<String, BoxError> {
                    Ok(img.alpha(32, 13).to_string())
                })
                .run(&source_png(), &config(), &web())
                .unwrap();
            let svg = String::from_utf8(assets.last().unwrap().bytes.clone()).unwrap();
            svg.parse().unwrap()
        };

        // White kept: the 60x40 source spans y 10.7..53.3
        assert!(probe(IconPackPipeline::default()) > 250);
        // White stripped: the 40x20 red box only spans y 16..48
        assert_eq!(
            probe(IconPackPipeline::default().with_background_remover(strip_white)),
            0
        );
    }

    #[test]
    fn failing_remover_falls_back_to_original() {
        let failing = |_: &RasterImage| -> std::result::Result<RasterImage, BoxError> {
            Err("model unavailable".into())
        };
        let baseline = IconPackPipeline::default()
            .run(&source_png(), &config(), &web())
            .unwrap();
        let assets = IconPackPipeline::default()
            .with_background_remover(failing)
            .run(&source_png(), &config(), &web())
            .unwrap();
        assert_eq!(assets, baseline);
    }

    #[test]
    fn resized_removal_output_is_ignored() {
        let shrinking = |_: &RasterImage| -> std::result::Result<RasterImage, BoxError> {
            Ok(RasterImage::new(RgbaImage::new(5, 5))?)
        };
        let baseline = IconPackPipeline::default()
            .run(&source_png(), &config(), &web())
            .unwrap();
        let assets = IconPackPipeline::default()
            .with_background_remover(shrinking)
            .run(&source_png(), &config(), &web())
            .unwrap();
        assert_eq!(assets, baseline);
    }

    #[test]
    fn tracer_output_lands_at_root() {
        let assets = IconPackPipeline::default()
            .with_tracer(|_: &RasterImage| -> std::result::Result<String, BoxError> {
                Ok("<svg xmlns=\"http://www.w3.org/2000/svg\"/>".into())
            })
            .run(&source_png(), &config(), &web())
            .unwrap();
        let svg = assets.iter().find(|a| a.path == SVG_ASSET_PATH).unwrap();
        assert!(svg.bytes.starts_with(b"<svg"));
    }

    #[test]
    fn failing_or_empty_tracer_omits_svg() {
        let failing = |_: &RasterImage| -> std::result::Result<String, BoxError> {
            Err("trace failed".into())
        };
        let empty = |_: &RasterImage| -> std::result::Result<String, BoxError> { Ok("  ".into()) };

        let assets = IconPackPipeline::default()
            .with_tracer(failing)
            .run(&source_png(), &config(), &web())
            .unwrap();
        assert!(assets.iter().all(|a| a.path != SVG_ASSET_PATH));

        let assets = IconPackPipeline::default()
            .with_tracer(empty)
            .run(&source_png(), &config(), &web())
            .unwrap();
        assert!(assets.iter().all(|a| a.path != SVG_ASSET_PATH));
    }

    #[test]
    fn undecodable_input_is_a_decode_error() {
        let err = IconPackPipeline::default()
            .run(b"definitely not an image", &config(), &web())
            .unwrap_err();
        assert!(matches!(err, IconError::Decode(_)));
    }

    #[test]
    fn invalid_config_is_reported_before_collaborators_run() {
        let panicking = |_: &RasterImage| -> std::result::Result<RasterImage, BoxError> {
            panic!("remover must not run for an invalid config")
        };
        let err = IconPackPipeline::default()
            .with_background_remover(panicking)
            .run(&source_png(), &ProcessorConfig::new(0), &web())
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn custom_catalog_is_used() {
        let catalog = PresetCatalog::from_json(
            r#"[{"id": "tiny", "name": "Tiny", "folder": "tiny", "sizes": [8]}]"#,
        )
        .unwrap();
        let assets = IconPackPipeline::new(IconSetGenerator::default(), catalog)
            .run(&source_png(), &config(), &PresetSelection::All)
            .unwrap();
        assert_eq!(paths(&assets), vec!["tiny/icon-8.png"]);
    }
}
