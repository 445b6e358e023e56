//! TOML-based application configuration.
//!
//! Stored at `~/.config/pomobar/config.toml`. Every field has a default so
//! a missing or partial file always yields a usable config.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::session::SessionTag;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Countdown length offered on launch, in minutes.
    #[serde(default = "default_duration_min")]
    pub duration_min: u32,
    /// Tag preselected for the next session.
    #[serde(default)]
    pub tag: SessionTag,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    #[serde(default = "default_true")]
    pub sounds_enabled: bool,
    /// Preference only; OS launch-at-login registration happens elsewhere.
    #[serde(default)]
    pub launch_at_login: bool,
}

fn default_duration_min() -> u32 {
    25
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration_min: default_duration_min(),
            tag: SessionTag::default(),
            notifications_enabled: true,
            sounds_enabled: true,
            launch_at_login: false,
        }
    }
}

impl Config {
    fn default_path() -> crate::error::Result<PathBuf> {
        Ok(super::data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults when absent.
    pub fn load() -> crate::error::Result<Self> {
        Ok(Self::load_from(Self::default_path()?)?)
    }

    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path,
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> crate::error::Result<()> {
        Ok(self.save_to(Self::default_path()?)?)
    }

    pub fn save_to(&self, path: impl Into<PathBuf>) -> Result<(), ConfigError> {
        let path = path.into();
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::Save {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, raw).map_err(|e| ConfigError::Save {
            path,
            message: e.to_string(),
        })
    }

    /// Apply a `key = value` update from the CLI or settings panel.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "duration_min" => {
                self.duration_min = value
                    .parse()
                    .map_err(|_| invalid(key, format!("expected minutes, got '{value}'")))?;
            }
            "tag" => {
                self.tag = value.parse().map_err(|message| invalid(key, message))?;
            }
            "notifications_enabled" => {
                self.notifications_enabled = parse_bool(key, value)?;
            }
            "sounds_enabled" => {
                self.sounds_enabled = parse_bool(key, value)?;
            }
            "launch_at_login" => {
                self.launch_at_login = parse_bool(key, value)?;
            }
            _ => {
                return Err(invalid(key, "unknown key".to_string()));
            }
        }
        Ok(())
    }
}

fn invalid(key: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value
        .parse()
        .map_err(|_| invalid(key, format!("expected true or false, got '{value}'")))
}
