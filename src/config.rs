use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

use crate::error::ConfigError;

/// Serializable engine settings. Every field has a default, so a config file
/// only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window title; `None` keeps the crate default.
    pub title: Option<String>,
    /// Internal game width in pixels.
    pub width: u32,
    /// Internal game height in pixels.
    pub height: u32,
    /// Number of simulation updates per second.
    pub update_frequency: u32,
    /// Upper bound on the wall time credited to a single frame, 1..=1000.
    pub max_frame_delta_ms: u64,
    /// Keep the game aspect ratio when the window is resized.
    pub auto_scaling: bool,
    /// Suppress the platform context menu on right click. Kept for config
    /// parity; native windows have no context menu to suppress.
    pub disable_context_menu: bool,
    /// Optional modules enabled at startup.
    pub load_modules: Vec<String>,
    /// Key that toggles the debug overlay.
    pub debug_toggle_key: KeyCode,
    /// Directory that resource paths are resolved against.
    pub asset_root: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: None,
            width: 1280,
            height: 720,
            update_frequency: 60,
            max_frame_delta_ms: 1000,
            auto_scaling: true,
            disable_context_menu: true,
            load_modules: Vec::new(),
            debug_toggle_key: KeyCode::F3,
            asset_root: PathBuf::from("."),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_frequency == 0 {
            return Err(ConfigError::InvalidUpdateFrequency);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        if !(1..=1000).contains(&self.max_frame_delta_ms) {
            return Err(ConfigError::InvalidMaxFrameDelta(self.max_frame_delta_ms));
        }
        Ok(())
    }

    /// Time between two simulation updates.
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.update_frequency.max(1) as f64)
    }

    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }
}
