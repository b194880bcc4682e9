//! Renderer configuration, loadable from JSON

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::curve::{DEFAULT_BEZIER_DETAIL, DEFAULT_CURVE_DETAIL};
use crate::error::{Error, Result};
use crate::image::ImageFormat;
use crate::style::STYLE_STACK_DEPTH;
use crate::transform::MATRIX_STACK_DEPTH;
use crate::vertex::DEFAULT_VERTEX_CAPACITY;

pub const DEFAULT_WIDTH: u32 = 100;
pub const DEFAULT_HEIGHT: u32 = 100;

/// Canvas size and the renderer's fixed limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub matrix_stack_depth: usize,
    pub style_stack_depth: usize,
    pub bezier_detail: u32,
    pub curve_detail: u32,
    pub curve_tightness: f32,
    /// Bilinear filtering for scaled image draws
    pub smooth: bool,
    /// Initial vertex records per shape
    pub vertex_capacity: usize,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            format: ImageFormat::Rgb,
            matrix_stack_depth: MATRIX_STACK_DEPTH,
            style_stack_depth: STYLE_STACK_DEPTH,
            bezier_detail: DEFAULT_BEZIER_DETAIL,
            curve_detail: DEFAULT_CURVE_DETAIL,
            curve_tightness: 0.0,
            smooth: true,
            vertex_capacity: DEFAULT_VERTEX_CAPACITY,
        }
    }
}

impl RendererConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Reject values the renderer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.matrix_stack_depth == 0 || self.style_stack_depth == 0 {
            return Err(Error::Config("stack depths must be at least 1".to_string()));
        }
        if self.bezier_detail == 0 || self.curve_detail == 0 {
            return Err(Error::Config("curve detail must be at least 1".to_string()));
        }
        if !self.curve_tightness.is_finite() {
            return Err(Error::Config(format!("curve tightness {} is not finite", self.curve_tightness)));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::debug!("loaded renderer config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = RendererConfig::from_json(r#"{ "width": 320, "height": 240 }"#).unwrap();
        assert_eq!(config.width, 320);
        assert_eq!(config.matrix_stack_depth, MATRIX_STACK_DEPTH);
        assert_eq!(config.bezier_detail, 20);
        assert_eq!(config.format, ImageFormat::Rgb);
        assert!(config.smooth);
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = RendererConfig::new(64, 48);
        config.format = ImageFormat::Argb;
        config.curve_tightness = 0.25;
        let back = RendererConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            RendererConfig::new(0, 10).validate(),
            Err(Error::InvalidDimensions { .. })
        ));
        let mut config = RendererConfig::default();
        config.curve_detail = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        assert!(matches!(RendererConfig::from_json("[1, 2"), Err(Error::Config(_))));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("easel-config-{}.json", std::process::id()));
        let config = RendererConfig::new(12, 34);
        config.save(&path).unwrap();
        let loaded = RendererConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
