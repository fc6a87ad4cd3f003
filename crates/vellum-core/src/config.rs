//! Editor configuration.
//!
//! Every tunable of the editing session lives here. The file is JSON,
//! versioned, and every field has a default so older or partial files load.

use crate::camera::{Camera, MAX_ZOOM, MIN_ZOOM, WHEEL_UNITS_PER_STEP, ZOOM_STEP_FACTOR};
use crate::capture::DEFAULT_MIN_SAMPLE_DISTANCE;
use crate::commands::DEFAULT_HISTORY_LIMIT;
use crate::model::InkColor;
use crate::recognize::RecognizerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Current configuration file format version.
pub const CONFIG_VERSION: u32 = 1;

/// Errors that can occur when loading or saving configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration file version {file_version} is newer than supported version {supported_version}")]
    VersionTooNew { file_version: u32, supported_version: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

/// Settings for one editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Format version of the file this was read from.
    pub version: u32,

    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Zoom multiplier per wheel step.
    pub zoom_step_factor: f64,
    /// Wheel delta units that make one zoom step.
    pub wheel_units_per_step: f64,
    /// Divisor applied to angle-based wheel deltas when panning.
    pub wheel_pan_divisor: f64,

    /// Pen samples closer than this (world units) are dropped.
    pub min_sample_distance: f64,
    /// Eraser radius in view pixels.
    pub eraser_radius_px: f64,
    /// Grab radius of a text box's resize corner, in view pixels.
    pub resize_handle_px: f64,

    /// Maximum number of undo steps.
    pub history_limit: usize,

    /// Snap finished strokes to shapes.
    pub smart_shapes: bool,
    /// Minimum recognizer score for a snap.
    pub shape_accept_threshold: f64,
    pub recognizer: RecognizerConfig,

    /// Quiet period before text edits become an undo step.
    pub text_debounce_ms: u64,
    pub text_box_width: f64,
    pub text_box_height: f64,

    pub pen_color: InkColor,
    pub pen_width: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step_factor: ZOOM_STEP_FACTOR,
            wheel_units_per_step: WHEEL_UNITS_PER_STEP,
            wheel_pan_divisor: 6.0,
            min_sample_distance: DEFAULT_MIN_SAMPLE_DISTANCE,
            eraser_radius_px: 10.0,
            resize_handle_px: 12.0,
            history_limit: DEFAULT_HISTORY_LIMIT,
            smart_shapes: true,
            shape_accept_threshold: 0.6,
            recognizer: RecognizerConfig::default(),
            text_debounce_ms: 350,
            text_box_width: 260.0,
            text_box_height: 120.0,
            pen_color: InkColor::ink(),
            pen_width: 2.0,
        }
    }
}

impl EditorConfig {
    /// Serialize the configuration to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON, rejecting newer format versions.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }
        Ok(config)
    }

    /// `<config_dir>/vellum/config.json`, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|dir| dir.join("vellum").join("config.json"))
    }

    /// Read from `path`.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load from the default location, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Self::default();
        }
        match Self::load_from_path(&path) {
            Ok(config) => {
                log::info!("Loaded configuration from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Write pretty JSON to `path`, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Save to the default location.
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to_path(&path)
    }

    /// A camera with this configuration's zoom limits.
    pub fn camera(&self) -> Camera {
        Camera::with_limits(self.min_zoom, self.max_zoom, self.zoom_step_factor)
    }

    pub fn text_debounce(&self) -> Duration {
        Duration::from_millis(self.text_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history_limit, 200);
        assert_eq!(config.shape_accept_threshold, 0.6);
        assert_eq!(config.text_debounce(), Duration::from_millis(350));
        assert_eq!(config.pen_color, InkColor::new(20, 20, 20, 255));
        assert!(config.smart_shapes);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config = EditorConfig::from_json(r#"{ "version": 1, "pen_width": 5.0 }"#).unwrap();
        assert_eq!(config.pen_width, 5.0);
        assert_eq!(config.eraser_radius_px, 10.0);
        assert_eq!(config.recognizer, RecognizerConfig::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let result = EditorConfig::from_json(r#"{ "version": 99 }"#);
        assert!(matches!(result, Err(ConfigError::VersionTooNew { file_version: 99, .. })));
    }

    #[test]
    fn test_save_and_load_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = EditorConfig::default();
        config.smart_shapes = false;
        config.history_limit = 50;
        config.save_to_path(&path).unwrap();

        let loaded = EditorConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_camera_limits() {
        let mut config = EditorConfig::default();
        config.max_zoom = 4.0;
        let mut camera = config.camera();
        camera.set_zoom(100.0);
        assert_eq!(camera.zoom(), 4.0);
    }
}
