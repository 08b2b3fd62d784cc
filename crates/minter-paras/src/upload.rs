//! Image + reference document uploads
//!
//! Both files go out in one multipart request under the `files` field; the
//! API answers with one content locator per file, in request order.

use crate::client::ParasClient;
use crate::error::ParasError;
use minter_model::{retry, ReferenceDocument, RetryError};
use minter_near::AuthToken;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// File name the reference document is uploaded as
pub const REFERENCE_FILE_NAME: &str = "reference.json";

/// Content type of the reference document part
pub const REFERENCE_MIME: &str = "application/json";

/// Content type of an image part, from the file extension
fn image_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Content locators returned by an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMetadata {
    /// Locator of the image (e.g. `ipfs://bafy...`)
    pub media: String,
    /// Locator of the reference document
    pub reference: String,
}

impl UploadedMetadata {
    /// Content hash of the image
    #[must_use]
    pub fn media_hash(&self) -> &str {
        strip_scheme(&self.media)
    }

    /// Content hash of the reference document
    #[must_use]
    pub fn reference_hash(&self) -> &str {
        strip_scheme(&self.reference)
    }
}

/// Part of a locator after `scheme://`
fn strip_scheme(locator: &str) -> &str {
    locator.split_once("://").map_or(locator, |(_, rest)| rest)
}

#[derive(Deserialize)]
struct UploadEnvelope {
    data: Vec<Value>,
}

fn parse_upload_response(endpoint: &str, body: &str) -> Result<UploadedMetadata, ParasError> {
    let envelope: UploadEnvelope =
        serde_json::from_str(body).map_err(|e| ParasError::malformed(endpoint, e.to_string()))?;

    let locator = |index: usize, label: &str| -> Result<String, ParasError> {
        let value = envelope
            .data
            .get(index)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ParasError::malformed(endpoint, format!("missing {label} locator at data[{index}]"))
            })?;
        match value.split_once("://") {
            Some((_, hash)) if !hash.is_empty() => Ok(value.to_string()),
            _ => Err(ParasError::malformed(
                endpoint,
                format!("{label} locator '{value}' has no content hash"),
            )),
        }
    };

    Ok(UploadedMetadata {
        media: locator(0, "media")?,
        reference: locator(1, "reference")?,
    })
}

impl ParasClient {
    /// Upload an image and its reference document
    ///
    /// Transient failures are retried per the client's upload policy.
    ///
    /// # Errors
    /// Returns [`ParasError::Io`] if the image cannot be read and
    /// [`ParasError::UploadFailed`] once the upload fails fatally or runs out
    /// of attempts
    pub async fn upload_metadata(
        &self,
        image_path: &Path,
        auth_token: &AuthToken,
        reference: &ReferenceDocument,
    ) -> Result<UploadedMetadata, ParasError> {
        let image = tokio::fs::read(image_path)
            .await
            .map_err(|source| ParasError::Io {
                path: image_path.to_path_buf(),
                source,
            })?;
        let image_name = image_path
            .file_name()
            .map_or_else(|| "image.png".to_string(), |n| n.to_string_lossy().into_owned());
        let reference_json = serde_json::to_vec(reference)?;
        let url = self.endpoint("uploads");

        let mime = image_mime(image_path);
        let result = retry(&self.upload_retry, "upload_metadata", |attempt| {
            let image = image.clone();
            let image_name = image_name.clone();
            let reference_json = reference_json.clone();
            let url = url.as_str();
            async move {
                let form = Form::new()
                    .part(
                        "files",
                        Part::bytes(image).file_name(image_name).mime_str(mime)?,
                    )
                    .part(
                        "files",
                        Part::bytes(reference_json)
                            .file_name(REFERENCE_FILE_NAME)
                            .mime_str(REFERENCE_MIME)?,
                    );
                tracing::debug!(attempt, url, "uploading metadata");
                let response = self
                    .http
                    .post(url)
                    .header(reqwest::header::AUTHORIZATION, auth_token.as_str())
                    .multipart(form)
                    .send()
                    .await?;
                let status = response.status();
                let body = response.text().await?;
                if !status.is_success() {
                    return Err(ParasError::Status {
                        status: status.as_u16(),
                        body,
                    });
                }
                parse_upload_response(url, &body)
            }
        })
        .await;

        result.map_err(|err: RetryError<ParasError>| {
            let attempts = err.attempts();
            ParasError::UploadFailed {
                attempts,
                source: Box::new(err.into_inner()),
            }
        })
    }
}
