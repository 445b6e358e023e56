//! Error types for pomobar-core.
//!
//! Invalid timer transitions are not errors at all -- they are silent no-ops
//! by contract. The types here cover the places where the caller explicitly
//! asked for I/O: opening stores, loading and saving configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for pomobar-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Session-log persistence errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read session log at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write session log at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Session log JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration at {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to save configuration to {path}: {message}")]
    Save { path: PathBuf, message: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
