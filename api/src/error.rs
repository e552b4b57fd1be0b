//! Error types for configuration and request preparation.
//!
//! Provides a unified error type covering every failure mode of this crate:
//! I/O, serialization, and configuration validation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading configuration or preparing requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Configuration is structurally valid YAML but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An options value did not serialize to a JSON object.
    #[error("options for {0} must serialize to an object")]
    InvalidOptions(String),

    /// A file attached for upload is missing or unreadable.
    #[error("cannot upload {}: {source}", path.display())]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for results with [`ApiError`].
pub type Result<T> = std::result::Result<T, ApiError>;
