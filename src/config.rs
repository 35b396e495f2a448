//! Configuration management for specsheet
//!
//! Config file location:
//! - Linux: ~/.config/specsheet/config.toml
//! - macOS: ~/Library/Application Support/specsheet/config.toml
//! - Windows: %APPDATA%/specsheet/config.toml
//!
//! You can override the config location by setting `SPECSHEET_CONFIG_PATH`.
//! A missing file simply yields the defaults; the tool never writes config.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Report output defaults
    #[serde(default)]
    pub output: OutputConfig,

    /// Probe behavior
    #[serde(default)]
    pub probe: ProbeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default report format: "text" or "json"
    pub format: String,
    /// Directory reports are written to; defaults to the working directory
    pub directory: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: "text".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-query timeout for management interface commands, in seconds
    pub timeout_secs: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig { timeout_secs: 10 }
    }
}

impl Config {
    /// Load configuration from file, or fall back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse config from {}", config_path.display()))
        } else {
            Ok(Self::default())
        }
    }

    fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("SPECSHEET_CONFIG_PATH") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        let proj_dirs = ProjectDirs::from("com", "pcbuilder", "specsheet")
            .context("Could not determine project directories")?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}
