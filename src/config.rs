//! Runtime settings with defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Time scale and focus animation settings.
    pub simulation: SimulationConfig,
    /// Camera rig settings.
    pub camera: CameraConfig,
    /// Texture and font locations.
    pub assets: AssetsConfig,
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
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated days per real second.
    pub days_per_second: f32,
    /// Multiplier on planet spin speed.
    pub spin_scale: f32,
    /// Seconds for the camera to fly to a clicked planet.
    pub travel_duration: f32,
    /// Seconds to stay focused before returning to the overview.
    pub focus_hold: f32,
    /// Focus camera offset, as a multiple of the planet radius.
    pub view_distance_factor: f32,
    /// Seed for the initial orbit angles. `None` picks one at startup.
    pub phase_seed: Option<u32>,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Overview camera position; the overview always looks at the origin.
    pub home_position: [f32; 3],
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of pending drag/zoom motion applied per frame.
    pub damping: f32,
    /// Radians of orbit per pixel dragged.
    pub rotate_sensitivity: f32,
    /// Fraction of distance zoomed per wheel line.
    pub zoom_sensitivity: f32,
}

/// Asset locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory that texture paths are relative to.
    pub texture_root: PathBuf,
    /// TrueType/OpenType font for the info panel.
    pub font_path: PathBuf,
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
            vsync: true,
            title: "Orrery".to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            days_per_second: 1.0,
            spin_scale: 0.01,
            travel_duration: 2.0,
            focus_hold: 5.0,
            view_distance_factor: 5.0,
            phase_seed: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
            home_position: [0.0, 50.0, 150.0],
            min_distance: 10.0,
            max_distance: 500.0,
            damping: 0.05,
            rotate_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            texture_root: PathBuf::from("textures"),
            font_path: PathBuf::from("fonts/DejaVuSans.ttf"),
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

// --- Load / Save ---

impl Config {
    /// Default directory for `config.ron`: the platform config dir, else the
    /// working directory.
    pub fn default_dir() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("orrery"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Path of `config.ron` inside `config_dir`.
    pub fn file_path(config_dir: &Path) -> PathBuf {
        config_dir.join("config.ron")
    }

    /// Load config from the given directory, or create a default config file.
    ///
    /// Runs before logging is set up, so it reports nothing itself.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = Self::file_path(config_dir);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            ron::from_str(&contents).map_err(ConfigError::ParseError)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = Self::file_path(config_dir);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("focus_hold: 5.0"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.simulation.phase_seed = Some(99);
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(window: (width: 800), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.simulation, SimulationConfig::default());
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.simulation.days_per_second = 30.0;
        config.assets.texture_root = PathBuf::from("/srv/textures");

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(Config::file_path(dir.path()).exists());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::file_path(dir.path()), "{{not valid}}").unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
