//! Composition settings.
//!
//! A [`ProcessorConfig`] describes the master composite: its edge length, the
//! padding around the logo, the corner rounding and the background fill. It
//! serializes to camelCase JSON so a frontend can hand it over unchanged:
//!
//! ```json
//! {
//!   "padding": 0.1,
//!   "borderRadius": 0.2,
//!   "backgroundColor": "#1e293b",
//!   "size": 1024
//! }
//! ```
//!
//! # Example
//!
//! ```
//! use iconpack_renderer::{Background, ProcessorConfig};
//!
//! let config = ProcessorConfig::from_json(
//!     r##"{"padding": 0.05, "borderRadius": 0.5, "backgroundColor": "#ffffff", "size": 256}"##,
//! )
//! .unwrap();
//!
//! assert_eq!(config.background_color, "white".parse::<Background>().unwrap());
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::str::FromStr;

use image::Rgba;
use palette::{Srgb, Srgba};
use serde::{Deserialize, Serialize};

use crate::error::{IconError, Result};

/// Largest padding / border radius fraction accepted.
pub const MAX_FRACTION: f32 = 0.5;

// ============================================================================
// Background
// ============================================================================

/// Background fill for the master composite.
///
/// Serializes as a string: `"transparent"`, or a hex color (`#rrggbb`, or
/// `#rrggbbaa` when not fully opaque). Parsing additionally accepts the short
/// `#rgb` / `#rgba` forms and CSS color names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Background {
    /// Leave the canvas transparent.
    #[default]
    Transparent,
    /// Fill the canvas with a straight-alpha color.
    Color(Rgba<u8>),
}

impl Background {
    /// An opaque color.
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Color(Rgba([r, g, b, 255]))
    }

    /// The fill color, if any.
    pub fn color(&self) -> Option<Rgba<u8>> {
        match self {
            Self::Transparent => None,
            Self::Color(c) => Some(*c),
        }
    }

    pub fn is_transparent(&self) -> bool {
        matches!(self, Self::Transparent)
    }
}

impl FromStr for Background {
    type Err = IconError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("transparent") {
            return Ok(Self::Transparent);
        }

        if let Some(hex) = value.strip_prefix('#') {
            let invalid = |_| IconError::config(format!("invalid hex color '{value}'"));
            return match hex.len() {
                3 | 6 => {
                    let c = Srgb::<u8>::from_str(hex).map_err(invalid)?;
                    Ok(Self::Color(Rgba([c.red, c.green, c.blue, 255])))
                }
                4 | 8 => {
                    let c = Srgba::<u8>::from_str(hex).map_err(invalid)?;
                    Ok(Self::Color(Rgba([c.red, c.green, c.blue, c.alpha])))
                }
                _ => Err(IconError::config(format!("invalid hex color '{value}'"))),
            };
        }

        palette::named::from_str(&value.to_ascii_lowercase())
            .map(|c| Self::Color(Rgba([c.red, c.green, c.blue, 255])))
            .ok_or_else(|| IconError::config(format!("unknown color '{value}'")))
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transparent => f.write_str("transparent"),
            Self::Color(Rgba([r, g, b, 255])) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Color(Rgba([r, g, b, a])) => write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}"),
        }
    }
}

impl TryFrom<String> for Background {
    type Error = IconError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Background> for String {
    fn from(value: Background) -> Self {
        value.to_string()
    }
}

// ============================================================================
// ProcessorConfig
// ============================================================================

/// Settings for composing the master icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "tsify", derive(tsify_next::Tsify), tsify(from_wasm_abi))]
pub struct ProcessorConfig {
    /// Margin on each side, as a fraction of `size` (0.0-0.5).
    pub padding: f32,

    /// Corner radius as a fraction of `size` (0.0-0.5). 0.5 yields a circle.
    pub border_radius: f32,

    /// Canvas fill behind the logo.
    #[serde(default)]
    #[cfg_attr(feature = "jsonschema", schemars(with = "String"))]
    #[cfg_attr(feature = "tsify", tsify(type = "string"))]
    pub background_color: Background,

    /// Edge length of the square master composite, in pixels.
    pub size: u32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            padding: 0.1,
            border_radius: 0.2,
            background_color: Background::Transparent,
            size: 512,
        }
    }
}

impl ProcessorConfig {
    /// Creates a config with no padding, square corners and a transparent
    /// background.
    pub fn new(size: u32) -> Self {
        Self {
            padding: 0.0,
            border_radius: 0.0,
            background_color: Background::Transparent,
            size,
        }
    }

    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_border_radius(mut self, border_radius: f32) -> Self {
        self.border_radius = border_radius;
        self
    }

    pub fn with_background(mut self, background: Background) -> Self {
        self.background_color = background;
        self
    }

    /// Checks every field, failing fast instead of clamping.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(IconError::config("size must be a positive integer"));
        }
        check_fraction("padding", self.padding)?;
        check_fraction("borderRadius", self.border_radius)?;
        Ok(())
    }

    /// Corner radius in pixels.
    pub fn radius_px(&self) -> f32 {
        self.size as f32 * self.border_radius
    }

    /// Serializes the config to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes a config from a JSON string.
    ///
    /// The result is not validated; call [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn check_fraction(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=MAX_FRACTION).contains(&value) {
        Ok(())
    } else {
        Err(IconError::config(format!(
            "{name} must be within [0, {MAX_FRACTION}], got {value}"
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_transparent_and_hex() {
        assert_eq!(
            "transparent".parse::<Background>().unwrap(),
            Background::Transparent
        );
        assert_eq!(
            " Transparent ".parse::<Background>().unwrap(),
            Background::Transparent
        );
        assert_eq!(
            "#ff8000".parse::<Background>().unwrap(),
            Background::rgb(255, 128, 0)
        );
        assert_eq!(
            "#fff".parse::<Background>().unwrap(),
            Background::rgb(255, 255, 255)
        );
        assert_eq!(
            "#00000080".parse::<Background>().unwrap(),
            Background::Color(Rgba([0, 0, 0, 128]))
        );
    }

    #[test]
    fn parses_named_colors() {
        assert_eq!(
            "red".parse::<Background>().unwrap(),
            Background::rgb(255, 0, 0)
        );
        assert_eq!(
            "RebeccaPurple".parse::<Background>().unwrap(),
            Background::rgb(102, 51, 153)
        );
    }

    #[test]
    fn rejects_bad_colors() {
        for bad in ["#12", "#gggggg", "not-a-color", "#1234567"] {
            let err = bad.parse::<Background>().unwrap_err();
            assert!(err.is_config(), "{bad} should be a config error");
        }
    }

    #[test]
    fn background_display_roundtrips() {
        for bg in [
            Background::Transparent,
            Background::rgb(1, 2, 3),
            Background::Color(Rgba([10, 20, 30, 40])),
        ] {
            assert_eq!(bg.to_string().parse::<Background>().unwrap(), bg);
        }
        assert_eq!(Background::rgb(255, 0, 171).to_string(), "#ff00ab");
    }

    #[test]
    fn config_json_uses_camel_case() {
        let config = ProcessorConfig::new(1024)
            .with_padding(0.1)
            .with_border_radius(0.25)
            .with_background(Background::rgb(0, 0, 0));
        let json = config.to_json().unwrap();

        assert!(json.contains("\"borderRadius\""));
        assert!(json.contains("\"backgroundColor\":\"#000000\""));

        let restored = ProcessorConfig::from_json(&json).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn missing_background_defaults_to_transparent() {
        let config =
            ProcessorConfig::from_json(r#"{"padding": 0, "borderRadius": 0, "size": 64}"#).unwrap();
        assert!(config.background_color.is_transparent());
    }

    #[test]
    fn invalid_background_fails_deserialization() {
        let err = ProcessorConfig::from_json(
            r#"{"padding": 0, "borderRadius": 0, "backgroundColor": "nope", "size": 64}"#,
        )
        .unwrap_err();
        assert!(matches!(err, IconError::Json(_)));
    }

    #[test]
    fn validation_fails_fast() {
        assert!(ProcessorConfig::default().validate().is_ok());
        assert!(ProcessorConfig::new(1).with_padding(0.5).with_border_radius(0.5).validate().is_ok());

        assert!(ProcessorConfig::new(0).validate().unwrap_err().is_config());
        assert!(ProcessorConfig::new(64).with_padding(0.51).validate().is_err());
        assert!(ProcessorConfig::new(64).with_padding(-0.01).validate().is_err());
        assert!(ProcessorConfig::new(64).with_border_radius(f32::NAN).validate().is_err());
        assert!(ProcessorConfig::new(64).with_border_radius(0.7).validate().is_err());
    }

    #[test]
    fn radius_scales_with_size() {
        let config = ProcessorConfig::new(200).with_border_radius(0.25);
        assert_eq!(config.radius_px(), 50.0);
    }
}
