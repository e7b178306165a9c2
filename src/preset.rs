//! Platform preset catalog.
//!
//! An [`IconPreset`] names a target platform, the folder its icons are
//! written to and the edge lengths it needs. A [`PresetCatalog`] is a
//! validated, ordered list of presets with unique ids.
//!
//! Catalogs load from JSON arrays:
//!
//! ```json
//! [
//!   {
//!     "id": "chrome",
//!     "name": "Chrome Extension",
//!     "folder": "chrome-extension",
//!     "sizes": [16, 32, 48, 128],
//!     "format": "png",
//!     "manifestIconsFile": true
//!   }
//! ]
//! ```

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{IconError, Result};
use crate::raster::OutputFormat;

// ============================================================================
// IconPreset
// ============================================================================

/// Icon requirements of one target platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct IconPreset {
    /// Stable identifier used for selection (e.g. `"ios"`).
    pub id: String,

    /// Human readable name (e.g. `"iOS App Icons"`).
    pub name: String,

    /// Folder, relative to the pack root, that receives this preset's icons.
    pub folder: String,

    /// Square edge lengths to generate, in pixels.
    pub sizes: Vec<u32>,

    /// Encoding for the generated icons.
    #[serde(default)]
    pub format: OutputFormat,

    /// Whether a `manifest-snippet.json` listing the icons is emitted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub manifest_icons_file: bool,
}

impl IconPreset {
    /// Creates a PNG preset without a manifest snippet.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        folder: impl Into<String>,
        sizes: impl Into<Vec<u32>>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            folder: folder.into(),
            sizes: sizes.into(),
            format: OutputFormat::Png,
            manifest_icons_file: false,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_manifest(mut self, enabled: bool) -> Self {
        self.manifest_icons_file = enabled;
        self
    }

    /// The configured sizes in ascending order.
    pub fn sorted_sizes(&self) -> Vec<u32> {
        let mut sizes = self.sizes.clone();
        sizes.sort_unstable();
        sizes
    }

    /// Checks the preset on its own: non-empty id and folder, positive and
    /// unique sizes.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(IconError::config("preset id must not be empty"));
        }
        if !is_relative_folder(&self.folder) {
            return Err(IconError::config(format!(
                "preset '{}' has invalid folder '{}'",
                self.id, self.folder
            )));
        }
        if self.sizes.is_empty() {
            return Err(IconError::config(format!(
                "preset '{}' declares no sizes",
                self.id
            )));
        }
        if self.sizes.contains(&0) {
            return Err(IconError::config(format!(
                "preset '{}' contains a zero size",
                self.id
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.sizes.iter().find(|s| !seen.insert(**s)) {
            return Err(IconError::config(format!(
                "preset '{}' lists size {} twice",
                self.id, dup
            )));
        }
        Ok(())
    }
}

fn is_relative_folder(folder: &str) -> bool {
    !folder.is_empty()
        && !folder.starts_with('/')
        && !folder.contains('\\')
        && folder
            .split('/')
            .all(|part| !part.is_empty() && part != "." && part != "..")
}

// ============================================================================
// PresetSelection
// ============================================================================

/// Which presets a generation should export.
///
/// An empty selection means "every preset in the catalog". This is a
/// documented default, not a fallback: [`PresetSelection::from_ids`] maps an
/// empty id list to [`PresetSelection::All`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PresetSelection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl PresetSelection {
    /// Builds a selection from preset ids; no ids selects everything.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: BTreeSet<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            Self::All
        } else {
            Self::Only(ids)
        }
    }

    pub fn includes(&self, id: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(id),
        }
    }
}

// ============================================================================
// PresetCatalog
// ============================================================================

/// A validated list of presets with unique ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetCatalog {
    presets: Vec<IconPreset>,
}

impl PresetCatalog {
    /// Validates and wraps `presets`, keeping their order.
    pub fn new(presets: Vec<IconPreset>) -> Result<Self> {
        if presets.is_empty() {
            return Err(IconError::config("preset catalog is empty"));
        }
        let mut ids = HashSet::new();
        for preset in &presets {
            preset.validate()?;
            if !ids.insert(preset.id.as_str()) {
                return Err(IconError::config(format!(
                    "duplicate preset id '{}'",
                    preset.id
                )));
            }
        }
        Ok(Self { presets })
    }

    /// The catalog shipped with the crate: Chrome extension, iOS, Android
    /// launcher and web favicons.
    pub fn builtin() -> Self {
        Self {
            presets: vec![
                IconPreset::new(
                    "chrome",
                    "Chrome Extension",
                    "chrome-extension",
                    [16, 32, 48, 128],
                )
                .with_manifest(true),
                IconPreset::new(
                    "ios",
                    "iOS App Icons",
                    "ios-assets",
                    [20, 29, 40, 58, 60, 76, 80, 87, 120, 152, 167, 180, 1024],
                ),
                IconPreset::new(
                    "android",
                    "Android Launcher",
                    "android-launcher",
                    [36, 48, 72, 96, 144, 192, 512],
                ),
                IconPreset::new("web", "Web Favicons", "web-assets", [16, 32, 192, 512]),
            ],
        }
    }

    /// Parses and validates a JSON array of presets.
    pub fn from_json(json: &str) -> Result<Self> {
        let presets: Vec<IconPreset> = serde_json::from_str(json)?;
        Self::new(presets)
    }

    /// Serializes the catalog to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.presets)?)
    }

    pub fn get(&self, id: &str) -> Option<&IconPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IconPreset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Resolves a selection to presets, in catalog order.
    ///
    /// Unknown ids are a config error.
    pub fn select(&self, selection: &PresetSelection) -> Result<Vec<&IconPreset>> {
        if let PresetSelection::Only(ids) = selection {
            if let Some(unknown) = ids.iter().find(|id| self.get(id).is_none()) {
                return Err(IconError::config(format!("unknown preset id '{unknown}'")));
            }
        }
        Ok(self
            .presets
            .iter()
            .filter(|p| selection.includes(&p.id))
            .collect())
    }
}

impl Default for PresetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl<'a> IntoIterator for &'a PresetCatalog {
    type Item = &'a IconPreset;
    type IntoIter = std::slice::Iter<'a, IconPreset>;

    fn into_iter(self) -> Self::IntoIter {
        self.presets.iter()
    }
}

// ============================================================================
// Tests
// ============================================================================
