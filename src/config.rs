//! Demo configuration.
//!
//! Settings are read from a JSON file. Every field has a default, so a partial file (or
//! no file at all at the default location) is fine.

use std::path::{Path, PathBuf};

use glam::Vec4;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::{AttribSetup, ClearColor, FadeCycle, FrameRenderer};
use crate::surface::RenderingMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "GLView".to_string(),
            width: 720,
            height: 1280,
            fullscreen: false,
            vsync: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearMode {
    Constant,
    #[default]
    Fade,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub clear: ClearMode,
    /// Used when `clear` is `constant`.
    pub clear_rgba: [f32; 4],
    pub attrib_setup: AttribSetup,
    pub mode: RenderingMode,
    pub check_errors: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear: ClearMode::default(),
            clear_rgba: [1.0, 1.0, 1.0, 1.0],
            attrib_setup: AttribSetup::default(),
            mode: RenderingMode::default(),
            check_errors: cfg!(debug_assertions),
        }
    }
}

impl RenderConfig {
    pub fn clear_color(&self) -> ClearColor {
        match self.clear {
            ClearMode::Constant => ClearColor::Constant(Vec4::from_array(self.clear_rgba)),
            ClearMode::Fade => ClearColor::Fade(FadeCycle::new()),
        }
    }

    pub fn frame_renderer(&self) -> FrameRenderer {
        FrameRenderer::new(self.clear_color(), self.attrib_setup)
            .with_error_checks(self.check_errors)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub render: RenderConfig,
    /// Sizes a tap cycles the window through.
    pub toggle_sizes: Vec<(u32, u32)>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            render: RenderConfig::default(),
            toggle_sizes: vec![(320, 320), (720, 1280)],
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// `<config dir>/glview/config.json`, when the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("glview").join("config.json"))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `explicit` if given (it must exist), else the default path if present, else
    /// the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }
}
