//! Configuration Module - User preferences from ~/.lacaktani/config.toml
//!
//! Supports:
//! - Classifier server address
//! - Theme preference (light/dark)
//! - Default folder for annotated result images

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::ui::Theme;

/// Server used when nothing else is configured
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

/// LacakTani Configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,
    /// Classifier server
    pub server: ServerConfig,
    /// Detection settings
    pub detect: DetectConfig,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Theme: light, dark
    pub theme: Theme,
    /// Log level: trace, debug, info, warn, error
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the classifier backend
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    /// Where annotated images are written (none = keep in memory only)
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        Ok(config)
    }

    /// Load `path` if given, else the default location; a missing file yields defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;

        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("id", "lacaktani", "lacaktani")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".lacaktani")
                    .join("config.toml")
            })
    }

    /// Create a commented default config at `path` if none exists.
    /// Returns true when a file was written.
    pub fn ensure_exists(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, generate_sample_config())
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        tracing::info!("Created default config at {}", path.display());
        Ok(true)
    }
}

/// Generate a sample config file with comments
pub fn generate_sample_config() -> String {
    r#"# LacakTani Configuration
# Location: ~/.config/lacaktani/config.toml (or %APPDATA%\lacaktani\config\config.toml on Windows)

[general]
# Theme: "light" or "dark"
theme = "light"

# Log level: trace, debug, info, warn, error
log_level = "info"

[server]
# Classifier backend
base_url = "http://127.0.0.1:5000"

[detect]
# Save annotated result images here (optional)
# output_dir = "/home/user/LacakTani"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.general.theme, Theme::Light);
        assert_eq!(config.server.base_url, DEFAULT_SERVER);
        assert!(config.detect.output_dir.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test_config.toml");

        let mut config = Config::default();
        config.general.theme = Theme::Dark;
        config.detect.output_dir = Some(PathBuf::from("/tmp/hasil"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_parse_sample_config() {
        let config: Config = toml::from_str(&generate_sample_config()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: Config = toml::from_str("[server]\nbase_url = \"http://kebun:8000\"\n").unwrap();
        assert_eq!(config.server.base_url, "http://kebun:8000");
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_ensure_exists_only_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        assert!(Config::ensure_exists(&path).unwrap());
        assert!(!Config::ensure_exists(&path).unwrap());
        assert!(Config::load_from(&path).is_ok());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_broken_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general\ntheme = ").unwrap();
        assert!(Config::load_or_default(Some(&path)).is_err());
    }
}
