//! Error types for the marketplace client

use minter_model::Retryable;
use std::path::PathBuf;

/// Marketplace API errors
#[derive(Debug, thiserror::Error)]
pub enum ParasError {
    /// Request could not be sent or the body not read
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("http status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not have the expected shape
    #[error("malformed response from {endpoint}: {message}")]
    MalformedResponse { endpoint: String, message: String },

    /// Local file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reference document could not be serialized
    #[error("failed to serialize reference document: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Upload gave up
    #[error("upload failed after {attempts} attempt(s): {source}")]
    UploadFailed {
        attempts: u32,
        #[source]
        source: Box<ParasError>,
    },
}

impl ParasError {
    /// Malformed response helper
    pub fn malformed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

impl Retryable for ParasError {
    /// Transport failures, timeouts, throttling and server errors
    fn is_transient(&self) -> bool {
        match self {
            Self::Transport(err) => !err.is_builder() && !err.is_decode(),
            Self::Status { status, .. } => matches!(*status, 408 | 429 | 500..=599),
            Self::MalformedResponse { .. }
            | Self::Io { .. }
            | Self::Serialize(_)
            | Self::UploadFailed { .. } => false,
        }
    }
}
