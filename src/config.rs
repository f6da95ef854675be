//! Configuration persistence for viewer settings

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::compositor::BlendMode;

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Serializable color for config storage, components in 0.0-1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_alpha")]
    pub a: f32,
}

fn default_alpha() -> f32 {
    1.0
}

impl StrokeColor {
    /// Opaque color from RGB components
    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Convert to image crate RGBA format (0-255)
    pub fn to_rgba_u8(self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }

    /// Convert to a tiny-skia paint color
    pub fn to_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
        .unwrap_or(tiny_skia::Color::WHITE)
    }
}

/// Colors, stroke widths and text sizes for the drawn overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Color for line annotations
    pub line_color: StrokeColor,
    /// Stroke width for line annotations in pixels
    pub line_width: f32,
    /// Color for angle annotation rays and labels
    pub angle_color: StrokeColor,
    /// Stroke width for angle rays in pixels
    pub angle_width: f32,
    /// Text size for the degree label next to an angle vertex
    pub angle_label_size: f32,
    /// Color for text annotations
    pub text_color: StrokeColor,
    /// Text size for text annotations
    pub text_size: f32,
    /// Color for the alignment grid
    pub grid_color: StrokeColor,
    /// Stroke width for the alignment grid
    pub grid_width: f32,
    /// Color for the center guide cross
    pub guide_color: StrokeColor,
    /// Stroke width for the center guides
    pub guide_width: f32,
    /// Font file for labels; when unset, common system fonts are probed
    pub font_path: Option<PathBuf>,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            line_color: StrokeColor::opaque(1.0, 0.0, 0.0),
            line_width: 3.0,
            angle_color: StrokeColor::opaque(0.0, 1.0, 0.0),
            angle_width: 3.0,
            angle_label_size: 16.0,
            text_color: StrokeColor::opaque(1.0, 1.0, 0.0),
            text_size: 18.0,
            grid_color: StrokeColor {
                r: 1.0,
                g: 1.0,
                b: 1.0,
                a: 0.133,
            },
            grid_width: 1.0,
            guide_color: StrokeColor {
                r: 1.0,
                g: 1.0,
                b: 1.0,
                a: 0.733,
            },
            guide_width: 2.0,
            font_path: None,
        }
    }
}

/// Application settings persisted between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Version of the configuration file format
    pub version: u32,
    /// Viewer canvas width in pixels
    pub viewer_width: u32,
    /// Viewer canvas height in pixels
    pub viewer_height: u32,
    /// Default opacity of the target layer (0.0-1.0)
    pub overlay_opacity: f32,
    /// Default blend mode of the target layer
    pub blend: BlendMode,
    /// Overlay drawing style
    pub overlay: OverlayStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            viewer_width: 1280,
            viewer_height: 720,
            overlay_opacity: 0.6,
            blend: BlendMode::Normal,
            overlay: OverlayStyle::default(),
        }
    }
}

impl Settings {
    /// Serialize the settings to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize settings from JSON, rejecting files from a newer build
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        if settings.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: settings.version,
                supported_version: CONFIG_VERSION,
            });
        }
        Ok(settings)
    }

    /// The default config file path, under the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("swingscope").join("config.json"))
        } else {
            dirs::home_dir().map(|home| home.join(".config").join("swingscope").join("config.json"))
        }
    }

    /// Load settings from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Some(settings) => settings,
            None => Self::default(),
        }
    }

    /// Try to load settings from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(settings)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }

    /// Save settings to the default path
    pub fn save_to_default_path(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(&path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
