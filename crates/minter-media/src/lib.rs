//! Minter Media - image placeholders
//!
//! Computes the blurhash stored in every reference document: the image is
//! decoded, given an alpha channel, shrunk to fit inside 32×32 and encoded
//! with a 4×4 component grid.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

use image::imageops::FilterType;
use std::path::{Path, PathBuf};

/// Longest edge of the thumbnail the hash is computed from
pub const THUMBNAIL_EDGE: u32 = 32;

/// Horizontal and vertical blurhash components
pub const COMPONENTS: (u32, u32) = (4, 4);

/// Errors while hashing an image
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Image could not be opened or decoded
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Blurhash encoder rejected the thumbnail
    #[error("failed to encode blurhash for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Hashing task panicked or was cancelled
    #[error("hashing task failed: {0}")]
    Task(String),
}

/// Compute the blurhash of an image file
///
/// # Errors
/// Returns error if the file cannot be decoded or the encoder fails
pub fn encode_image_to_blurhash(path: &Path) -> Result<String, MediaError> {
    let decoded = image::open(path).map_err(|source| MediaError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let thumbnail = decoded
        .resize(THUMBNAIL_EDGE, THUMBNAIL_EDGE, FilterType::Lanczos3)
        .to_rgba8();
    let (width, height) = thumbnail.dimensions();

    let hash = blurhash::encode(COMPONENTS.0, COMPONENTS.1, width, height, thumbnail.as_raw())
        .map_err(|e| MediaError::Encode {
            path: path.to_path_buf(),
            message: format!("{e:?}"),
        })?;

    tracing::debug!(path = %path.display(), width, height, %hash, "computed blurhash");
    Ok(hash)
}

/// Compute the blurhash on the blocking pool
///
/// # Errors
/// Same as [`encode_image_to_blurhash`], plus [`MediaError::Task`] if the
/// blocking task is lost
pub async fn hash_image(path: PathBuf) -> Result<String, MediaError> {
    tokio::task::spawn_blocking(move || encode_image_to_blurhash(&path))
        .await
        .map_err(|e| MediaError::Task(e.to_string()))?
}
