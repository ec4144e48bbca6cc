//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level globe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Globe geometry, camera and animation settings.
    pub globe: GlobeConfig,
    /// Input settings.
    pub input: InputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Device pixel ratio override. `0.0` uses the window scale factor.
    pub pixel_ratio: f32,
    /// Background clear colour (linear RGBA).
    pub clear_color: [f32; 4],
    /// Colour of the hover/selection outline glow.
    pub outline_color: [f32; 3],
    /// Outline thickness in physical pixels.
    pub outline_thickness: f32,
    /// Run the FXAA pass at the end of the chain.
    pub antialias: bool,
}

/// Globe geometry, camera and animation tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobeConfig {
    /// Initial camera position. Its length is the initial dolly distance.
    pub camera_start: [f32; 3],
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Inner soft bound for dollying.
    pub min_distance: f32,
    /// Camera distance from the globe centre while a country is selected.
    pub select_distance: f32,
    /// Scale reached by an extruded country.
    pub extrude_scale: f32,
    /// Inner radius used to build extrusion meshes.
    pub extrude_inner_radius: f32,
    /// Duration of the extrude/intrude animation in seconds.
    pub extrude_duration_s: f32,
    /// Duration of a camera flight in seconds.
    pub camera_move_duration_s: f32,
    /// Relative distance change per dolly step.
    pub dolly_step: f32,
}

/// Input configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Pointer travel in logical pixels beyond which a press becomes a drag.
    pub drag_threshold_px: f32,
    /// Radians of orbit per logical pixel of drag.
    pub orbit_sensitivity: f32,
    /// Force touch-style interaction (`Some(true)`), mouse-style (`Some(false)`),
    /// or detect from the first pointer event (`None`).
    pub touch_mode: Option<bool>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Orbis".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 0.0,
            clear_color: [0.0, 0.0, 0.01, 1.0],
            outline_color: [1.0, 1.0, 1.0],
            outline_thickness: 2.0,
            antialias: true,
        }
    }
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            camera_start: [0.0, 2.4, 3.2],
            fov_degrees: 45.0,
            min_distance: 1.6,
            select_distance: 2.2,
            extrude_scale: 1.08,
            extrude_inner_radius: 0.9,
            extrude_duration_s: 0.6,
            camera_move_duration_s: 1.0,
            dolly_step: 0.05,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 4.0,
            orbit_sensitivity: 0.005,
            touch_mode: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for Orbis, falling back to the working directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("orbis"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
