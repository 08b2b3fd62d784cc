//! Marketplace REST client

use crate::error::ParasError;
use minter_model::{Collection, RetryPolicy};
use serde::Deserialize;
use std::time::Duration;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Deserialize)]
struct CollectionsEnvelope {
    data: CollectionsPage,
}

#[derive(Deserialize)]
struct CollectionsPage {
    results: Vec<Collection>,
}

/// Client for the Paras API
#[derive(Debug, Clone)]
pub struct ParasClient {
    pub(crate) http: reqwest::Client,
    pub(crate) api_url: String,
    pub(crate) upload_retry: RetryPolicy,
}

impl ParasClient {
    /// Client for an API base URL (e.g. `https://api-v2-testnet.paras.id`)
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(api_url: impl Into<String>, upload_retry: RetryPolicy) -> Result<Self, ParasError> {
        let http = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            upload_retry,
        })
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// First collection the API returns for `(creator_id, collection_id)`
    ///
    /// The API filters loosely, so callers must still compare the id.
    ///
    /// # Errors
    /// Returns error on transport failure, non-success status or a body
    /// without `data.results`
    pub async fn find_collection(
        &self,
        creator_id: &str,
        collection_id: &str,
    ) -> Result<Option<Collection>, ParasError> {
        let url = self.endpoint("collections");
        let response = self
            .http
            .get(&url)
            .query(&[("creator_id", creator_id), ("collection_id", collection_id)])
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

        let envelope: CollectionsEnvelope =
            serde_json::from_str(&body).map_err(|e| ParasError::malformed(&url, e.to_string()))?;
        let first = envelope.data.results.into_iter().next();
        tracing::debug!(creator_id, collection_id, found = ?first, "collection lookup");
        Ok(first)
    }
}
