//! External services the orchestrator depends on
//!
//! Each stage sits behind a trait so runs can be exercised without a network
//! or a funded account. The production implementations wrap the media, NEAR
//! and Paras crates.

use crate::error::{ContractError, MintError};
use async_trait::async_trait;
use minter_model::{Collection, ReferenceDocument, SeriesParams};
use minter_near::{generate_auth_token, AuthToken, ContractClient, MessageSigner};
use minter_paras::{ParasClient, UploadedMetadata};
use std::path::Path;
use std::sync::Arc;

/// Contract method that registers a token series
pub const CREATE_SERIES_METHOD: &str = "nft_create_series";

/// Marketplace API: collection lookup and metadata uploads
#[async_trait]
pub trait Marketplace: Send + Sync {
    /// First collection matching the creator and id
    async fn find_collection(
        &self,
        creator_id: &str,
        collection_id: &str,
    ) -> Result<Option<Collection>, MintError>;

    /// Upload an image with its reference document
    async fn upload_metadata(
        &self,
        image_path: &Path,
        auth_token: &AuthToken,
        reference: &ReferenceDocument,
    ) -> Result<UploadedMetadata, MintError>;
}

/// Perceptual hash of an image
#[async_trait]
pub trait ImageHasher: Send + Sync {
    /// Hash the image at `path`
    async fn hash_image(&self, path: &Path) -> Result<String, MintError>;
}

/// Source of fresh marketplace bearer tokens
#[async_trait]
pub trait AuthTokenSource: Send + Sync {
    /// Generate a token for the configured account
    async fn auth_token(&self) -> Result<AuthToken, MintError>;
}

/// Token contract accepting series registrations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeriesContract: Send + Sync {
    /// Call `nft_create_series`; returns the transaction hash
    async fn create_series(
        &self,
        params: &SeriesParams,
        gas: u64,
        deposit: u128,
    ) -> Result<String, ContractError>;
}

#[async_trait]
impl Marketplace for ParasClient {
    async fn find_collection(
        &self,
        creator_id: &str,
        collection_id: &str,
    ) -> Result<Option<Collection>, MintError> {
        Ok(ParasClient::find_collection(self, creator_id, collection_id).await?)
    }

    async fn upload_metadata(
        &self,
        image_path: &Path,
        auth_token: &AuthToken,
        reference: &ReferenceDocument,
    ) -> Result<UploadedMetadata, MintError> {
        Ok(ParasClient::upload_metadata(self, image_path, auth_token, reference).await?)
    }
}

/// Blurhash over a 32×32 thumbnail with 4×4 components
#[derive(Debug, Clone, Copy, Default)]
pub struct BlurhashHasher;

#[async_trait]
impl ImageHasher for BlurhashHasher {
    async fn hash_image(&self, path: &Path) -> Result<String, MintError> {
        Ok(minter_media::hash_image(path.to_path_buf()).await?)
    }
}

/// Tokens signed by a message signer for one account
#[derive(Clone)]
pub struct SignerTokenSource {
    signer: Arc<dyn MessageSigner>,
    account_id: String,
    network_id: String,
}

impl SignerTokenSource {
    /// Token source for an account
    #[must_use]
    pub fn new(
        signer: Arc<dyn MessageSigner>,
        account_id: impl Into<String>,
        network_id: impl Into<String>,
    ) -> Self {
        Self {
            signer,
            account_id: account_id.into(),
            network_id: network_id.into(),
        }
    }
}

impl std::fmt::Debug for SignerTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignerTokenSource")
            .field("account_id", &self.account_id)
            .field("network_id", &self.network_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthTokenSource for SignerTokenSource {
    async fn auth_token(&self) -> Result<AuthToken, MintError> {
        Ok(generate_auth_token(&self.account_id, self.signer.as_ref(), &self.network_id).await?)
    }
}

/// Token contract reached through a NEAR account
#[derive(Debug)]
pub struct NearSeriesContract {
    client: ContractClient,
    contract_id: String,
}

impl NearSeriesContract {
    /// Bind the signing account to a contract
    #[must_use]
    pub fn new(client: ContractClient, contract_id: impl Into<String>) -> Self {
        Self {
            client,
            contract_id: contract_id.into(),
        }
    }
}

#[async_trait]
impl SeriesContract for NearSeriesContract {
    async fn create_series(
        &self,
        params: &SeriesParams,
        gas: u64,
        deposit: u128,
    ) -> Result<String, ContractError> {
        let outcome = self
            .client
            .call_change_method(&self.contract_id, CREATE_SERIES_METHOD, params, gas, deposit)
            .await?;
        Ok(outcome.tx_hash)
    }
}
