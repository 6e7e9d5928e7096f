//! Configuration management for svgguard.

use crate::detection::sanitizer::SanitizeOptions;
use crate::detection::scanner::ScanLevel;
use crate::report::DEFAULT_GENERATED_BY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub sanitize: SanitizeOptions,
    pub report: ReportConfig,
    pub audit: AuditSettings,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from an explicit path, or from the default path when it exists.
    ///
    /// An explicit path must exist. A missing default file yields the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("svgguard")
            .join("config.toml")
    }

    /// Serialize configuration to TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Scan defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub level: ScanLevel,
    pub recursive: bool,
}

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub project: String,
    pub version: String,
    pub generated_by: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            project: "svg-icons".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_by: DEFAULT_GENERATED_BY.to_string(),
        }
    }
}

/// Audit log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    /// Record scan, sanitize and report events
    pub enabled: bool,
    /// Log file location
    pub path: PathBuf,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("svgguard")
                .join("audit.log"),
        }
    }
}
