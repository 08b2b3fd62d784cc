//! Sequential mint loop
//!
//! One item at a time: hash the image, sign a fresh auth token, build and
//! upload the reference document, then register the series. The first error
//! aborts the run; items minted before it stay on chain.

use crate::error::MintError;
use crate::minter::SeriesMinter;
use crate::services::{AuthTokenSource, ImageHasher, Marketplace};
use minter_model::{
    load_attributes, AssetNames, Collection, MintConfig, ReferenceDocument, Royalty, SeriesParams,
    TokenMetadata,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Hash written into series params during a dry run
pub const DRY_RUN_HASH: &str = "dry-run";

/// Services wired into the orchestrator
#[derive(Clone)]
pub struct Services {
    /// Marketplace API
    pub marketplace: Arc<dyn Marketplace>,
    /// Image hasher
    pub hasher: Arc<dyn ImageHasher>,
    /// Auth token source
    pub tokens: Arc<dyn AuthTokenSource>,
    /// Series minter
    pub minter: SeriesMinter,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("minter", &self.minter)
            .finish_non_exhaustive()
    }
}

/// One successfully processed item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MintedSeries {
    /// 1-based item index
    pub index: u32,
    /// Series title
    pub title: String,
    /// Content hash of the image
    pub media_hash: String,
    /// Content hash of the reference document
    pub reference_hash: String,
    /// Transaction hash; `None` in dry runs
    pub tx_hash: Option<String>,
}

/// Result of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Items in mint order
    pub minted: Vec<MintedSeries>,
}

impl RunSummary {
    /// Number of processed items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.minted.len()
    }

    /// Whether no item was processed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.minted.is_empty()
    }
}

/// Drives a mint run over the configured item range
#[derive(Debug)]
pub struct Orchestrator {
    config: MintConfig,
    services: Services,
}

impl Orchestrator {
    /// Create orchestrator
    #[must_use]
    pub fn new(config: MintConfig, services: Services) -> Self {
        Self { config, services }
    }

    /// Configuration of this run
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MintConfig {
        &self.config
    }

    /// Run every item in order
    ///
    /// # Errors
    /// Returns the first failure, wrapped with the item index when it happened
    /// inside the loop. Nothing is uploaded or minted when the collection
    /// check fails.
    pub async fn run(&self) -> Result<RunSummary, MintError> {
        self.config.validate()?;

        let collection = if self.config.dry_run {
            info!("dry run: skipping collection lookup, uploads and contract calls");
            Collection {
                collection_id: self.config.collection_id.clone(),
                collection: self.config.collection_id.clone(),
            }
        } else {
            self.verify_collection().await?
        };

        let mut summary = RunSummary::default();
        for index in self.config.indices() {
            match self.mint_item(index, &collection).await {
                Ok(minted) => summary.minted.push(minted),
                Err(err) => {
                    let err = err.for_item(index);
                    error!(
                        index,
                        completed = summary.len(),
                        error = %err,
                        "aborting run"
                    );
                    return Err(err);
                }
            }
        }

        info!(items = summary.len(), "run complete");
        Ok(summary)
    }

    /// Look up the target collection
    ///
    /// # Errors
    /// Returns [`MintError::CollectionNotFound`] when the lookup has no result
    /// or the first result has a different id
    pub async fn verify_collection(&self) -> Result<Collection, MintError> {
        let creator_id = &self.config.account_id;
        let collection_id = &self.config.collection_id;

        let found = self
            .services
            .marketplace
            .find_collection(creator_id, collection_id)
            .await?;

        match found {
            Some(collection) if collection.collection_id == *collection_id => {
                info!(collection_id = %collection.collection_id, name = %collection.collection, "collection found");
                Ok(collection)
            }
            _ => Err(MintError::CollectionNotFound {
                creator_id: creator_id.clone(),
                collection_id: collection_id.clone(),
            }),
        }
    }

    /// Process a single item
    ///
    /// # Errors
    /// Returns the first failing stage's error
    #[instrument(skip(self, collection), fields(collection_id = %collection.collection_id))]
    pub async fn mint_item(
        &self,
        index: u32,
        collection: &Collection,
    ) -> Result<MintedSeries, MintError> {
        let paths = AssetNames::for_index(index).resolve(&self.config.build_path);

        let blurhash = self.services.hasher.hash_image(&paths.image).await?;
        let token = if self.config.dry_run {
            None
        } else {
            Some(self.services.tokens.auth_token().await?)
        };
        let attributes = load_attributes(&paths.traits).await?;
        let reference = ReferenceDocument::new(
            self.config.description.clone(),
            collection,
            self.config.account_id.clone(),
            attributes,
            blurhash,
        );
        debug!(reference = ?reference, "reference document");

        let Some(token) = token else {
            let params = self.build_series_params(index, DRY_RUN_HASH, DRY_RUN_HASH);
            debug!(params = ?params, "series params");
            info!(index, title = %params.token_metadata.title, "dry run item ready");
            return Ok(MintedSeries {
                index,
                title: params.token_metadata.title,
                media_hash: DRY_RUN_HASH.to_string(),
                reference_hash: DRY_RUN_HASH.to_string(),
                tx_hash: None,
            });
        };

        let uploaded = self
            .services
            .marketplace
            .upload_metadata(&paths.image, &token, &reference)
            .await?;
        let media_hash = uploaded.media_hash().to_string();
        let reference_hash = uploaded.reference_hash().to_string();
        debug!(%media_hash, %reference_hash, "uploaded");

        let params = self.build_series_params(index, &media_hash, &reference_hash);
        debug!(params = ?params, "series params");

        let tx_hash = self.services.minter.create_series(&params).await?;
        info!(index, title = %params.token_metadata.title, %tx_hash, "series created");

        Ok(MintedSeries {
            index,
            title: params.token_metadata.title,
            media_hash,
            reference_hash,
            tx_hash: Some(tx_hash),
        })
    }

    /// Contract arguments for one item
    #[must_use]
    pub fn build_series_params(&self, index: u32, media_hash: &str, reference_hash: &str) -> SeriesParams {
        SeriesParams {
            creator_id: self.config.account_id.clone(),
            token_metadata: TokenMetadata {
                title: format!("{} {index}", self.config.title_prefix),
                media: media_hash.to_string(),
                copies: self.config.copies,
                reference: reference_hash.to_string(),
            },
            royalty: Royalty::single(self.config.account_id.clone(), self.config.royalty_basis_points),
        }
    }
}
