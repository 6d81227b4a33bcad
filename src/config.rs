//! Persistent settings for fixture-locator

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::geometry::Size;

const APP_DIR: &str = "fixture-locator";
const CONFIG_FILE: &str = "config.json";

/// Serializable stroke color, 0.0..=1.0 per channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self {
            r: 1.0,
            g: 0.0,
            b: 0.0,
        }
    }
}

impl StrokeColor {
    pub fn to_egui(self) -> egui::Color32 {
        egui::Color32::from_rgb(
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
        )
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            255,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Area the slide is fitted into inside the locate dialog
    pub modal_size: Size,
    pub stroke_color: StrokeColor,
    pub stroke_thickness: f32,
    /// Appended to the slide's file stem when exporting
    pub export_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            modal_size: Size::new(640.0, 480.0),
            stroke_color: StrokeColor::default(),
            stroke_thickness: 2.0,
            export_suffix: "_fixtures".to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Load from the user config dir, falling back to defaults on any error.
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            log::debug!("No config directory available, using defaults");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{:#}; using defaults", e);
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)
            .with_context(|| format!("Failed to write config {}", path.display()))
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.modal_size.is_degenerate() {
            log::warn!("Ignoring unusable modal size {:?}", self.modal_size);
            self.modal_size = defaults.modal_size;
        }
        if !(self.stroke_thickness > 0.0) {
            self.stroke_thickness = defaults.stroke_thickness;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "stroke_thickness": 4.5 }"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.stroke_thickness, 4.5);
        assert_eq!(config.modal_size, Size::new(640.0, 480.0));
        assert_eq!(config.export_suffix, "_fixtures");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }

    #[test]
    fn test_degenerate_modal_size_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "modal_size": { "width": 0.0, "height": 480.0 }, "stroke_thickness": -1.0 }"#,
        )
        .unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.modal_size, Size::new(640.0, 480.0));
        assert_eq!(config.stroke_thickness, 2.0);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            modal_size: Size::new(800.0, 600.0),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_stroke_color_to_rgba() {
        assert_eq!(StrokeColor::default().to_rgba_u8(), [255, 0, 0, 255]);
    }
}
