//! Application settings for the curation tools.
//!
//! Settings are stored as JSON in the user's config directory and can be
//! overridden from the command line.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CurateError, Result};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

/// File name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Current settings file format version.
/// Increment this when making breaking changes to the settings format.
pub const SETTINGS_VERSION: u32 = 1;

/// User settings that persist between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Version of the settings file format
    pub version: u32,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// State directory used when none is given explicitly
    #[serde(default)]
    pub default_state_dir: Option<PathBuf>,

    /// Maximum number of undo steps kept per session
    #[serde(default = "default_undo_history")]
    pub undo_history: usize,
}

fn default_undo_history() -> usize {
    100
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            log_level: LogLevel::default(),
            default_state_dir: None,
            undo_history: default_undo_history(),
        }
    }
}

impl AppSettings {
    /// Serialize the settings to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize settings from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;

        if settings.version > SETTINGS_VERSION {
            return Err(CurateError::VersionTooNew {
                file_version: settings.version,
                supported_version: SETTINGS_VERSION,
            });
        }

        Ok(settings)
    }

    /// Settings location: `<config dir>/segcurate/settings.json`, falling back
    /// to `~/.config` when the platform reports no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .map(|dir| dir.join("segcurate").join(SETTINGS_FILE))
    }

    /// Read settings from `path`. A missing file is `Ok(None)`.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            log::debug!("No settings file at {:?}", path);
            return Ok(None);
        }
        let json = std::fs::read_to_string(path).map_err(|e| CurateError::io(path, e))?;
        let settings = Self::from_json(&json)?;
        log::debug!("Loaded settings from {:?}", path);
        Ok(Some(settings))
    }

    /// Settings from the default location, or defaults when absent or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(settings) => settings.unwrap_or_default(),
            Err(e) => {
                log::warn!("Ignoring settings file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Write settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CurateError::io(parent, e))?;
        }
        std::fs::write(path, self.to_json()?).map_err(|e| CurateError::io(path, e))?;
        log::info!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_roundtrip() {
        let settings = AppSettings {
            log_level: LogLevel::Debug,
            default_state_dir: Some(PathBuf::from("/data/state")),
            ..AppSettings::default()
        };
        let json = settings.to_json().expect("serialize");
        assert!(json.contains("\"debug\""));
        assert_eq!(AppSettings::from_json(&json).expect("parse"), settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings = AppSettings::from_json(r#"{"version": 1}"#).expect("parse");
        assert_eq!(settings, AppSettings::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        assert!(matches!(
            AppSettings::from_json(r#"{"version": 2}"#),
            Err(CurateError::VersionTooNew {
                file_version: 2,
                supported_version: 1
            })
        ));
    }

    #[test]
    fn test_save_and_load_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("nested").join(SETTINGS_FILE);
        assert!(AppSettings::load(&path).expect("missing file").is_none());

        let settings = AppSettings {
            undo_history: 7,
            ..AppSettings::default()
        };
        settings.save(&path).expect("save settings");
        assert_eq!(AppSettings::load(&path).expect("load"), Some(settings));

        std::fs::write(&path, "{").expect("corrupt settings");
        assert!(matches!(AppSettings::load(&path), Err(CurateError::Json(_))));
    }

    #[test]
    fn test_default_path_is_namespaced() {
        if let Some(path) = AppSettings::default_path() {
            assert!(path.ends_with("segcurate/settings.json"));
        }
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    }
}
