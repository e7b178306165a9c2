//! Icon set generation across presets.
//!
//! The master composite is built once; every `(preset, size)` pair is then
//! resampled from that shared, read-only master. With the `parallel` feature
//! the resizes fan out over rayon's thread pool. Output order is identical
//! either way: presets in catalog order, sizes ascending, manifest last.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::compositor::compose;
use crate::config::ProcessorConfig;
use crate::error::Result;
use crate::preset::{IconPreset, PresetCatalog, PresetSelection};
use crate::raster::RasterImage;
use crate::resample::Resampler;

/// File name of the per-preset manifest snippet.
pub const MANIFEST_FILE_NAME: &str = "manifest-snippet.json";

/// Directory the manifest snippet assumes the icons are copied to.
pub const MANIFEST_ICON_DIR: &str = "icons";

// ============================================================================
// GeneratedAsset
// ============================================================================

/// One file of the icon pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAsset {
    /// Path relative to the pack root, `/`-separated.
    pub path: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl GeneratedAsset {
    pub fn new(path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }
}

/// Relative path of the icon for `size` within `preset`.
pub fn icon_path(preset: &IconPreset, size: u32) -> String {
    format!("{}/{}", preset.folder, icon_file_name(preset, size))
}

fn icon_file_name(preset: &IconPreset, size: u32) -> String {
    format!("icon-{}.{}", size, preset.format.extension())
}

#[derive(Serialize)]
struct ManifestSnippet {
    // Integer keys keep numeric order; serde_json writes them as strings.
    icons: BTreeMap<u32, String>,
}

/// Renders the `{"icons": {"16": "icons/icon-16.png", ...}}` snippet for a
/// browser-extension manifest.
pub fn manifest_snippet(preset: &IconPreset) -> Result<String> {
    let icons = preset
        .sorted_sizes()
        .into_iter()
        .map(|size| {
            (
                size,
                format!("{}/{}", MANIFEST_ICON_DIR, icon_file_name(preset, size)),
            )
        })
        .collect();
    Ok(serde_json::to_string_pretty(&ManifestSnippet { icons })?)
}

// ============================================================================
// IconSetGenerator
// ============================================================================

/// Builds icon packs from a source image.
///
/// # Example
///
/// ```
/// use iconpack_renderer::{
///     IconSetGenerator, PresetCatalog, PresetSelection, ProcessorConfig, RasterImage,
/// };
/// use image::{Rgba, RgbaImage};
///
/// let logo = RasterImage::new(RgbaImage::from_pixel(64, 32, Rgba([255, 0, 0, 255])))?;
/// let generator = IconSetGenerator::default();
///
/// let assets = generator.generate(
///     &logo,
///     &ProcessorConfig::new(128),
///     &PresetCatalog::builtin(),
///     &PresetSelection::from_ids(["chrome"]),
/// )?;
///
/// assert_eq!(assets.len(), 5);
/// assert_eq!(assets[0].path, "chrome-extension/icon-16.png");
/// # Ok::<(), iconpack_renderer::IconError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct IconSetGenerator {
    resampler: Resampler,
}

impl IconSetGenerator {
    pub fn new(resampler: Resampler) -> Self {
        Self { resampler }
    }

    pub fn resampler(&self) -> &Resampler {
        &self.resampler
    }

    /// Composes `source` once and emits every selected preset's icons.
    pub fn generate(
        &self,
        source: &RasterImage,
        config: &ProcessorConfig,
        catalog: &PresetCatalog,
        selection: &PresetSelection,
    ) -> Result<Vec<GeneratedAsset>> {
        // Resolve the selection before spending time on composition.
        catalog.select(selection)?;
        let master = compose(source, config)?;
        self.generate_from_master(&master, catalog, selection)
    }

    /// Emits every selected preset's icons from an existing master.
    ///
    /// Any failing resize aborts the whole generation.
    pub fn generate_from_master(
        &self,
        master: &RasterImage,
        catalog: &PresetCatalog,
        selection: &PresetSelection,
    ) -> Result<Vec<GeneratedAsset>> {
        self.resampler.options().validate()?;
        let presets = catalog.select(selection)?;

        let jobs: Vec<(&IconPreset, u32)> = presets
            .iter()
            .flat_map(|preset| {
                preset
                    .sorted_sizes()
                    .into_iter()
                    .map(move |size| (*preset, size))
            })
            .collect();

        let icons = self.render_jobs(master, &jobs)?;

        let mut assets = Vec::with_capacity(icons.len() + presets.len());
        let mut icons = icons.into_iter();
        for preset in &presets {
            assets.extend(icons.by_ref().take(preset.sizes.len()));
            if preset.manifest_icons_file {
                assets.push(GeneratedAsset::new(
                    format!("{}/{}", preset.folder, MANIFEST_FILE_NAME),
                    manifest_snippet(preset)?,
                ));
            }
        }

        log::info!(
            "generated {} assets for {} preset(s) from {}x{} master",
            assets.len(),
            presets.len(),
            master.width(),
            master.height()
        );
        Ok(assets)
    }

    fn render_job(
        &self,
        master: &RasterImage,
        preset: &IconPreset,
        size: u32,
    ) -> Result<GeneratedAsset> {
        let bytes = self.resampler.resize_as(master, size, size, preset.format)?;
        Ok(GeneratedAsset::new(icon_path(preset, size), bytes))
    }

    #[cfg(feature = "parallel")]
    fn render_jobs(
        &self,
        master: &RasterImage,
        jobs: &[(&IconPreset, u32)],
    ) -> Result<Vec<GeneratedAsset>> {
        use rayon::prelude::*;

        jobs.par_iter()
            .map(|(preset, size)| self.render_job(master, preset, *size))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn render_jobs(
        &self,
        master: &RasterImage,
        jobs: &[(&IconPreset, u32)],
    ) -> Result<Vec<GeneratedAsset>> {
        jobs.iter()
            .map(|(preset, size)| self.render_job(master, preset, *size))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IconError;
    use crate::raster::OutputFormat;
    use crate::resample::ResampleOptions;
    use image::{Rgba, RgbaImage};

    fn logo() -> RasterImage {
        let mut img = RgbaImage::new(120, 80);
        for y in 10..70 {
            for x in 20..100 {
                img.put_pixel(x, y, Rgba([250, 120, 0, 255]));
            }
        }
        RasterImage::new(img).unwrap()
    }

    fn config() -> ProcessorConfig {
        ProcessorConfig::new(256).with_padding(0.1).with_border_radius(0.2)
    }

    #[test]
    fn chrome_selection_emits_icons_and_manifest() {
        let generator = IconSetGenerator::default();
        let assets = generator
            .generate(
                &logo(),
                &config(),
                &PresetCatalog::builtin(),
                &PresetSelection::from_ids(["chrome"]),
            )
            .unwrap();

        let paths: Vec<_> = assets.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "chrome-extension/icon-16.png",
                "chrome-extension/icon-32.png",
                "chrome-extension/icon-48.png",
                "chrome-extension/icon-128.png",
                "chrome-extension/manifest-snippet.json",
            ]
        );

        let manifest: serde_json::Value = serde_json::from_slice(&assets[4].bytes).unwrap();
        assert_eq!(manifest["icons"]["16"], "icons/icon-16.png");
        assert_eq!(manifest["icons"]["128"], "icons/icon-128.png");
        assert_eq!(manifest["icons"].as_object().unwrap().len(), 4);
    }

    #[test]
    fn empty_selection_exports_every_preset() {
        let catalog = PresetCatalog::builtin();
        let assets = IconSetGenerator::default()
            .generate(&logo(), &config(), &catalog, &PresetSelection::All)
            .unwrap();

        let icon_count: usize = catalog.iter().map(|p| p.sizes.len()).sum();
        assert_eq!(assets.len(), icon_count + 1);
        for preset in &catalog {
            assert!(
                assets.iter().any(|a| a.path.starts_with(&format!("{}/", preset.folder))),
                "missing assets for {}",
                preset.id
            );
        }
    }

    #[test]
    fn every_icon_has_its_exact_size() {
        let catalog = PresetCatalog::builtin();
        let assets = IconSetGenerator::default()
            .generate(&logo(), &config(), &catalog, &PresetSelection::All)
            .unwrap();

        let mut checked = 0;
        for preset in &catalog {
            for size in &preset.sizes {
                let asset = assets
                    .iter()
                    .find(|a| a.path == icon_path(preset, *size))
                    .unwrap_or_else(|| panic!("missing {}", icon_path(preset, *size)));
                let decoded = RasterImage::decode(&asset.bytes).unwrap();
                assert_eq!((decoded.width(), decoded.height()), (*size, *size));
                checked += 1;
            }
        }
        assert_eq!(checked, 4 + 13 + 7 + 4);
    }

    #[test]
    fn sizes_are_emitted_ascending() {
        let catalog = PresetCatalog::new(vec![IconPreset::new(
            "shuffled",
            "Shuffled",
            "out",
            [64, 16, 32],
        )])
        .unwrap();
        let assets = IconSetGenerator::default()
            .generate(&logo(), &config(), &catalog, &PresetSelection::All)
            .unwrap();
        let paths: Vec<_> = assets.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(paths, vec!["out/icon-16.png", "out/icon-32.png", "out/icon-64.png"]);
    }

    #[test]
    fn jpeg_presets_use_jpg_extension() {
        let catalog = PresetCatalog::new(vec![
            IconPreset::new("photo", "Photo", "photo", [40])
                .with_format(OutputFormat::Jpeg)
                .with_manifest(true),
        ])
        .unwrap();
        let assets = IconSetGenerator::default()
            .generate(&logo(), &config(), &catalog, &PresetSelection::All)
            .unwrap();
        assert_eq!(assets[0].path, "photo/icon-40.jpg");
        assert_eq!(&assets[0].bytes[..2], &[0xFF, 0xD8]);

        let manifest: serde_json::Value = serde_json::from_slice(&assets[1].bytes).unwrap();
        assert_eq!(manifest["icons"]["40"], "icons/icon-40.jpg");
    }

    #[test]
    fn invalid_config_aborts_generation() {
        let err = IconSetGenerator::default()
            .generate(
                &logo(),
                &ProcessorConfig::new(0),
                &PresetCatalog::builtin(),
                &PresetSelection::All,
            )
            .unwrap_err();
        assert!(matches!(err, IconError::Config(_)));
    }

    #[test]
    fn invalid_resample_options_abort_generation() {
        let generator = IconSetGenerator::new(Resampler::new(ResampleOptions {
            quality: f32::NAN,
            ..Default::default()
        }));
        let err = generator
            .generate(
                &logo(),
                &config(),
                &PresetCatalog::builtin(),
                &PresetSelection::from_ids(["chrome"]),
            )
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn unknown_preset_aborts_generation() {
        let err = IconSetGenerator::default()
            .generate(
                &logo(),
                &config(),
                &PresetCatalog::builtin(),
                &PresetSelection::from_ids(["symbian"]),
            )
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn manifest_lists_sizes_in_order() {
        let preset = IconPreset::new("c", "C", "c", [128, 16]).with_manifest(true);
        let json = manifest_snippet(&preset).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["icons"]["16"], "icons/icon-16.png");
        assert_eq!(value["icons"]["128"], "icons/icon-128.png");
        assert!(json.find("\"16\"").unwrap() < json.find("\"128\"").unwrap());
    }

    #[test]
    fn chrome_manifest_keys_are_numeric_order() {
        let catalog = PresetCatalog::builtin();
        let json = manifest_snippet(catalog.get("chrome").unwrap()).unwrap();
        let positions: Vec<usize> = ["16", "32", "48", "128"]
            .iter()
            .map(|size| json.find(&format!("\"{size}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }
}
