//! Error types for the minter model

use std::path::PathBuf;

/// Errors raised while loading assets or configuration
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// IO error while reading a file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Trait file is not the expected JSON shape
    #[error("invalid trait file {path}: {message}")]
    InvalidTraits { path: PathBuf, message: String },

    /// Configuration file could not be parsed
    #[error("invalid config file {path}: {message}")]
    InvalidConfigFile { path: PathBuf, message: String },

    /// Configuration value is out of range
    #[error("configuration error: {0}")]
    Config(String),
}

impl ModelError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
