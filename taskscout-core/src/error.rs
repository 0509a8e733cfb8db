//! Error types for taskscout-core

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the taskscout-core library
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A parameter definition violated one of its construction rules
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    /// Discovery was asked to scan something that is not a directory
    #[error("invalid project root: {0}")]
    InvalidProjectRoot(PathBuf),

    /// An artifact could not be turned into a command
    #[error("normalization error: {0}")]
    Normalization(String),

    /// Catalog persistence error
    #[error("catalog error: {0}")]
    Catalog(String),
}

impl Error {
    pub(crate) fn invalid_parameter(name: &str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

/// Result type alias for taskscout-core
pub type Result<T> = std::result::Result<T, Error>;
