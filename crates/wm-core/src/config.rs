// ABOUTME: Application configuration handling.
// ABOUTME: Loads and saves window-manager settings from TOML config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::Color;

/// UI colors handed to panes when they are activated and drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,
    pub background: Color,
    pub text: Color,
    pub text_highlight: Color,
    pub text_error: Color,
    /// Divider lines and chrome outlines
    pub ui_control: Color,
    /// Console input line and other "active" surfaces
    pub ui_control_active: Color,
}

impl ColorScheme {
    /// Dark blue-gray scope colors
    pub fn dark() -> Self {
        Self {
            name: "Dark".to_string(),
            background: Color::rgb(0.04, 0.05, 0.07),
            text: Color::rgb(0.85, 0.85, 0.85),
            text_highlight: Color::rgb(0.95, 0.8, 0.3),
            text_error: Color::rgb(0.9, 0.25, 0.2),
            ui_control: Color::rgb(0.35, 0.38, 0.42),
            ui_control_active: Color::rgb(0.16, 0.2, 0.26),
        }
    }

    /// Amber monochrome
    pub fn amber() -> Self {
        Self {
            name: "Amber".to_string(),
            background: Color::rgb(0.05, 0.02, 0.0),
            text: Color::rgb(1.0, 0.506, 0.0),
            text_highlight: Color::rgb(1.0, 0.7, 0.2),
            text_error: Color::rgb(1.0, 0.3, 0.1),
            ui_control: Color::rgb(0.4, 0.2, 0.0),
            ui_control_active: Color::rgb(0.2, 0.1, 0.0),
        }
    }

    /// Light background for daytime use
    pub fn light() -> Self {
        Self {
            name: "Light".to_string(),
            background: Color::rgb(0.93, 0.93, 0.9),
            text: Color::rgb(0.1, 0.1, 0.1),
            text_highlight: Color::rgb(0.1, 0.3, 0.8),
            text_error: Color::rgb(0.8, 0.1, 0.1),
            ui_control: Color::rgb(0.6, 0.6, 0.6),
            ui_control_active: Color::rgb(0.8, 0.82, 0.86),
        }
    }

    pub fn presets() -> Vec<ColorScheme> {
        vec![Self::dark(), Self::amber(), Self::light()]
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::dark()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window dimensions in logical pixels
    pub window_width: u32,
    pub window_height: u32,

    /// Height of the status bar strip above the panes (logical pixels)
    pub status_bar_height: f32,

    /// Height of the layout editor bar while it is open (logical pixels)
    pub editor_bar_height: f32,

    /// Active color scheme
    pub color_scheme: ColorScheme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_width: 1200,
            window_height: 800,
            status_bar_height: 24.0,
            editor_bar_height: 60.0,
            color_scheme: ColorScheme::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

impl Config {
    /// Directory holding splitwm's files (~/.config/splitwm)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("splitwm"))
    }

    /// Get the default config file path (~/.config/splitwm/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to default path
    pub fn save_to_default(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or_else(|| {
            ConfigError::ReadError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;
        self.save(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.color_scheme = ColorScheme::amber();
        config.status_bar_height = 30.0;

        let path = std::env::temp_dir().join("splitwm_test_config.toml");
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.color_scheme, ColorScheme::amber());
        assert_eq!(loaded.status_bar_height, 30.0);
        assert_eq!(loaded.window_width, 1200);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = toml::from_str("window_width = 640").unwrap();
        assert_eq!(config.window_width, 640);
        assert_eq!(config.window_height, 800);
        assert_eq!(config.color_scheme.name, "Dark");
    }
}
