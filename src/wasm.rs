//! Browser bindings.
//!
//! Only available with the `tsify` feature. Configuration objects cross the
//! boundary as plain JS objects (see the generated `ProcessorConfig` type);
//! images cross as `Uint8Array`s of encoded file bytes.
//!
//! # Example (TypeScript)
//!
//! ```javascript
//! import init, { IconPackRenderer } from 'iconpack-renderer';
//!
//! await init();
//!
//! const renderer = IconPackRenderer.fromBytes(uploadedPng);
//! const config = { padding: 0.1, borderRadius: 0.2, backgroundColor: '#ffffff', size: 1024 };
//!
//! // Live preview of the master composite
//! const preview = renderer.composePreview(config);
//!
//! // Everything for the zip, or only some presets
//! const assets = renderer.generate(config, ['chrome', 'web']);
//! for (const asset of assets) zip.file(asset.path, asset.bytes);
//! ```

use wasm_bindgen::prelude::*;

use crate::compositor::compose;
use crate::config::ProcessorConfig;
use crate::error::IconError;
use crate::generator::{GeneratedAsset, IconSetGenerator};
use crate::preset::{PresetCatalog, PresetSelection};
use crate::raster::RasterImage;

fn js_error(e: IconError) -> JsError {
    JsError::new(&e.to_string())
}

fn selection_from_js(selected: JsValue) -> Result<PresetSelection, JsError> {
    let ids: Option<Vec<String>> = serde_wasm_bindgen::from_value(selected)
        .map_err(|e| JsError::new(&format!("Expected an array of preset ids: {}", e)))?;
    Ok(PresetSelection::from_ids(ids.unwrap_or_default()))
}

// ============================================================================
// WasmAsset
// ============================================================================

/// A generated file handed back to JavaScript.
#[wasm_bindgen]
pub struct WasmAsset {
    path: String,
    bytes: Vec<u8>,
}

#[wasm_bindgen]
impl WasmAsset {
    #[wasm_bindgen(getter)]
    pub fn path(&self) -> String {
        self.path.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }
}

impl From<GeneratedAsset> for WasmAsset {
    fn from(asset: GeneratedAsset) -> Self {
        Self {
            path: asset.path,
            bytes: asset.bytes,
        }
    }
}

// ============================================================================
// IconPackRenderer
// ============================================================================

/// Holds a decoded source image so repeated previews skip decoding.
#[wasm_bindgen]
pub struct IconPackRenderer {
    source: RasterImage,
    generator: IconSetGenerator,
    catalog: PresetCatalog,
}

#[wasm_bindgen]
impl IconPackRenderer {
    /// Decodes an uploaded image (PNG, JPEG, WebP, ...).
    #[wasm_bindgen(js_name = "fromBytes")]
    pub fn from_bytes(bytes: &[u8]) -> Result<IconPackRenderer, JsError> {
        Ok(Self {
            source: RasterImage::decode(bytes).map_err(js_error)?,
            generator: IconSetGenerator::default(),
            catalog: PresetCatalog::builtin(),
        })
    }

    /// Replaces the built-in presets with a JSON array of presets.
    #[wasm_bindgen(js_name = "setPresetsJson")]
    pub fn set_presets_json(&mut self, json: &str) -> Result<(), JsError> {
        self.catalog = PresetCatalog::from_json(json).map_err(js_error)?;
        Ok(())
    }

    /// Returns the active presets as a JSON array.
    #[wasm_bindgen(js_name = "presetsJson")]
    pub fn presets_json(&self) -> Result<String, JsError> {
        self.catalog.to_json_pretty().map_err(js_error)
    }

    /// Width and height of the decoded source.
    #[wasm_bindgen(js_name = "sourceDimensions")]
    pub fn source_dimensions(&self) -> Vec<u32> {
        vec![self.source.width(), self.source.height()]
    }

    /// Composes the master icon and returns it as PNG bytes.
    #[wasm_bindgen(js_name = "composePreview")]
    pub fn compose_preview(&self, config: ProcessorConfig) -> Result<Vec<u8>, JsError> {
        compose(&self.source, &config)
            .and_then(|master| master.to_png())
            .map_err(js_error)
    }

    /// Generates the icon pack. `selected` is an array of preset ids;
    /// `null`, `undefined` or `[]` selects every preset.
    pub fn generate(
        &self,
        config: ProcessorConfig,
        selected: JsValue,
    ) -> Result<Vec<WasmAsset>, JsError> {
        let selection = selection_from_js(selected)?;
        let assets = self
            .generator
            .generate(&self.source, &config, &self.catalog, &selection)
            .map_err(js_error)?;
        Ok(assets.into_iter().map(WasmAsset::from).collect())
    }
}

// ============================================================================
// One-shot functions
// ============================================================================

/// Decodes `bytes` and generates the icon pack with the built-in presets.
#[wasm_bindgen(js_name = "generateIconPack")]
pub fn generate_icon_pack(
    bytes: &[u8],
    config: ProcessorConfig,
    selected: JsValue,
) -> Result<Vec<WasmAsset>, JsError> {
    IconPackRenderer::from_bytes(bytes)?.generate(config, selected)
}

/// Decodes `bytes` and returns the master composite as PNG bytes.
#[wasm_bindgen(js_name = "composePreview")]
pub fn compose_preview(bytes: &[u8], config: ProcessorConfig) -> Result<Vec<u8>, JsError> {
    IconPackRenderer::from_bytes(bytes)?.compose_preview(config)
}
