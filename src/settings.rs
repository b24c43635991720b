//! Tool settings
//!
//! Parses the optional `extconf.toml` that tells the CLI where the config and
//! extensions areas live, how files are named, and how to log.
//!
//! ```toml
//! [areas]
//! config = "app/config"
//! extensions = "extensions"
//!
//! [layout]
//! local_suffix = "_local"
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigLayout;
use crate::store::{CONFIG_AREA, EXTENSIONS_AREA};

/// Default settings file name, looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "extconf.toml";

/// Settings for the `extconf` tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Area name -> root directory. Relative roots are resolved against the
    /// settings file's directory.
    #[serde(default = "default_areas")]
    pub areas: BTreeMap<String, PathBuf>,

    /// File naming conventions
    #[serde(default)]
    pub layout: ConfigLayout,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

fn default_areas() -> BTreeMap<String, PathBuf> {
    let mut areas = BTreeMap::new();
    areas.insert(CONFIG_AREA.to_string(), PathBuf::from("config"));
    areas.insert(EXTENSIONS_AREA.to_string(), PathBuf::from("extensions"));
    areas
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            areas: default_areas(),
            layout: ConfigLayout::default(),
            logging: LoggingSettings::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive: trace, debug, info, warn, error, off, or a full
    /// `EnvFilter` expression
    pub level: String,

    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(SettingsError::Invalid(format!(
                "Invalid log format: {} (must be 'text' or 'json')",
                other
            ))),
        }
    }
}

/// Errors from loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid settings: {0}")]
    Invalid(String),
}

impl Settings {
    /// Load settings from a file; a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Load settings from a specific file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        let mut settings = Self::parse(&content)?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for root in settings.areas.values_mut() {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }

        Ok(settings)
    }

    /// Parse settings from a TOML string. Missing standard areas fall back
    /// to their defaults.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = toml::from_str(content)?;
        for (area, root) in default_areas() {
            settings.areas.entry(area).or_insert(root);
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Override an area root
    pub fn set_area(&mut self, area: &str, root: PathBuf) {
        self.areas.insert(area.to_string(), root);
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.layout.file_extension.is_empty() {
            return Err(SettingsError::Invalid(
                "layout.file_extension must not be empty".to_string(),
            ));
        }
        if self.layout.local_suffix.is_empty() {
            return Err(SettingsError::Invalid(
                "layout.local_suffix must not be empty".to_string(),
            ));
        }
        for area in [&self.layout.config_area, &self.layout.extensions_area] {
            if !self.areas.contains_key(area) {
                return Err(SettingsError::Invalid(format!(
                    "layout refers to undefined area '{}'",
                    area
                )));
            }
        }
        Ok(())
    }
}
