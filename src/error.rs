//! Error types for the IPS portal
//!
//! Mirrors the layered thiserror style used across the crate: one top-level
//! error for anything that can fail while talking to the procedures, and a
//! dedicated configuration error raised at startup.

use thiserror::Error;

/// Main error type for procedure calls and row decoding
#[derive(Error, Debug)]
pub enum PortalError {
    #[cfg(feature = "database")]
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("Could not decode {kind} row {index}: {source}")]
    RowDecode {
        kind: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Configuration errors raised while reading `.env` / YAML files
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid database URL: {0}")]
    Url(#[from] url::ParseError),
}

pub type Result<T, E = PortalError> = std::result::Result<T, E>;
