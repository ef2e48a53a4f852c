//! Overlay configuration, stored as TOML next to the calibration storage.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, Level};

use crate::controller::HealthSettings;
use crate::persistence::file_store::get_config_dir;
use crate::persistence::FileStore;
use crate::visualization::DirectionalSettings;

const CONFIG_DIR: &str = "hitbox-bongocat";
const CONFIG_FILE: &str = "config.toml";
const EXPORT_FILE: &str = "bongo-cat-config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

/// Top-level overlay configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlayConfig {
    /// Stick used for directionals and where directionals come from
    pub input: DirectionalSettings,
    /// Minimum device shape
    pub health: HealthSettings,
    pub ui: UiSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiSettings {
    /// Seconds without pointer or keyboard activity before the config bar hides
    pub auto_hide_secs: f32,
    /// Repaint interval while no gamepad is connected
    pub idle_poll_ms: u64,
    pub window_width: f32,
    pub window_height: f32,
    pub export_path: PathBuf,
    pub import_path: PathBuf,
}

impl Default for UiSettings {
    fn default() -> Self {
        let transfer_file = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(EXPORT_FILE);
        Self {
            auto_hide_secs: 5.0,
            idle_poll_ms: 500,
            window_width: 640.0,
            window_height: 360.0,
            export_path: transfer_file.clone(),
            import_path: transfer_file,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// Key-value file holding calibration and background colour
    pub path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            path: FileStore::default_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// "trace", "debug", "info", "warn" or "error"
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingSettings {
    /// Unknown names fall back to INFO
    pub fn max_level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }
}

impl OverlayConfig {
    /// `<config dir>/hitbox-bongocat/config.toml`
    pub fn default_path() -> PathBuf {
        let mut path = get_config_dir();
        path.push(CONFIG_DIR);
        path.push(CONFIG_FILE);
        path
    }

    /// Reads the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            info!("Created default config at {}", path.display());
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteError(format!("{}: {}", parent.display(), e)))?;
            }
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        fs::write(path, content)
            .map_err(|e| ConfigError::WriteError(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visualization::DirectionalSource;

    #[test]
    fn defaults_match_the_overlay_constants() {
        let config = OverlayConfig::default();
        assert_eq!(config.input.axis_index_x, 0);
        assert_eq!(config.input.axis_index_y, 1);
        assert_eq!(config.input.directional_source, DirectionalSource::Buttons);
        assert_eq!(config.health.min_buttons, 4);
        assert_eq!(config.health.min_axes, 2);
        assert_eq!(config.health.max_validation_errors, 10);
        assert_eq!(config.ui.idle_poll_ms, 500);
        assert_eq!(config.ui.auto_hide_secs, 5.0);
        assert_eq!(config.logging.max_level(), Level::INFO);
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");

        let config = OverlayConfig::load_or_create(&path).unwrap();
        assert_eq!(config, OverlayConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = OverlayConfig::default();
        config.input.directional_source = DirectionalSource::Axes;
        config.input.invert_y = true;
        config.ui.auto_hide_secs = 2.5;
        config.logging.level = "debug".to_string();
        config.save(&path).unwrap();

        let loaded = OverlayConfig::load_or_create(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.logging.max_level(), Level::DEBUG);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[input]\ndirectional_source = \"axes\"\naxis_index_x = 2\n",
        )
        .unwrap();

        let loaded = OverlayConfig::load_or_create(&path).unwrap();
        assert_eq!(loaded.input.directional_source, DirectionalSource::Axes);
        assert_eq!(loaded.input.axis_index_x, 2);
        assert_eq!(loaded.input.axis_index_y, 1);
        assert_eq!(loaded.ui, UiSettings::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[input\naxis_index_x = ").unwrap();

        assert!(matches!(
            OverlayConfig::load_or_create(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let logging = LoggingSettings {
            level: "chatty".to_string(),
        };
        assert_eq!(logging.max_level(), Level::INFO);
    }
}
