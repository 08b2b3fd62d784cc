//! Documents built for each minted item
//!
//! A [`ReferenceDocument`] is uploaded next to the image; the hashes returned
//! by the upload go into [`TokenMetadata`], which together with the
//! [`Royalty`] table forms the [`SeriesParams`] passed to the contract.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// One `{trait_type, value}` pair of the reference document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Trait name
    pub trait_type: String,
    /// Trait value (string or number as produced by the generator)
    pub value: Value,
}

/// Entry of a generated trait file
#[derive(Debug, Deserialize)]
struct TraitEntry {
    name: String,
    value: Value,
}

/// Parse a trait file body into attributes, keeping the file's key order
///
/// # Errors
/// Returns error if the body is not a JSON object of `{name, value}` entries
pub fn parse_attributes(body: &str, path: &Path) -> Result<Vec<Attribute>, ModelError> {
    let invalid = |message: String| ModelError::InvalidTraits {
        path: path.to_path_buf(),
        message,
    };

    let object: serde_json::Map<String, Value> =
        serde_json::from_str(body).map_err(|e| invalid(e.to_string()))?;

    object
        .into_iter()
        .map(|(key, entry)| {
            let entry: TraitEntry = serde_json::from_value(entry)
                .map_err(|e| invalid(format!("entry '{key}': {e}")))?;
            Ok(Attribute {
                trait_type: entry.name,
                value: entry.value,
            })
        })
        .collect()
}

/// Read and parse a trait file
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub async fn load_attributes(path: &Path) -> Result<Vec<Attribute>, ModelError> {
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ModelError::io_error(path, e))?;
    parse_attributes(&body, path)
}

/// Collection record returned by the marketplace API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection identifier
    pub collection_id: String,
    /// Human-readable collection name
    pub collection: String,
}

/// Off-chain reference document uploaded with each image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceDocument {
    /// Item description
    pub description: String,
    /// Collection name
    pub collection: String,
    /// Collection identifier
    pub collection_id: String,
    /// Creator account
    pub creator_id: String,
    /// Ordered traits
    pub attributes: Vec<Attribute>,
    /// Blurhash placeholder of the image
    pub blurhash: String,
}

impl ReferenceDocument {
    /// Build the reference document for one item
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        collection: &Collection,
        creator_id: impl Into<String>,
        attributes: Vec<Attribute>,
        blurhash: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            collection: collection.collection.clone(),
            collection_id: collection.collection_id.clone(),
            creator_id: creator_id.into(),
            attributes,
            blurhash: blurhash.into(),
        }
    }
}

/// On-chain token metadata of a series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    /// Series title
    pub title: String,
    /// Content hash of the media file
    pub media: String,
    /// Number of copies the series allows
    pub copies: u64,
    /// Content hash of the reference document
    pub reference: String,
}

/// Royalty table: account id → basis points
///
/// The 10000 ceiling is enforced by the receiving contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Royalty(pub BTreeMap<String, u32>);

impl Royalty {
    /// Royalty table with a single beneficiary
    #[must_use]
    pub fn single(account_id: impl Into<String>, basis_points: u32) -> Self {
        let mut table = BTreeMap::new();
        table.insert(account_id.into(), basis_points);
        Self(table)
    }
}

/// Arguments of the `nft_create_series` contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesParams {
    /// Creator account
    pub creator_id: String,
    /// Series metadata
    pub token_metadata: TokenMetadata,
    /// Royalty table
    pub royalty: Royalty,
}
