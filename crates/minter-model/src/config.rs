//! Mint run configuration
//!
//! Replaces the fixed account, collection and contract constants with one
//! value handed to the orchestrator. Defaults reproduce the testnet avatar
//! drop; a TOML file and CLI flags override them.

use crate::error::ModelError;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Gas attached to every `nft_create_series` call (100 Tgas)
pub const DEFAULT_GAS: u64 = 100_000_000_000_000;

/// Deposit attached to every `nft_create_series` call (0.00854 NEAR)
pub const DEFAULT_DEPOSIT: u128 = 8_540_000_000_000_000_000_000;

/// NEAR network connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Network identifier used for key lookup and signing
    pub network_id: String,
    /// JSON-RPC endpoint
    pub node_url: String,
}

impl NetworkConfig {
    /// Public testnet endpoints
    #[must_use]
    pub fn testnet() -> Self {
        Self {
            network_id: "testnet".to_string(),
            node_url: "https://rpc.testnet.near.org".to_string(),
        }
    }

    /// Public mainnet endpoints
    #[must_use]
    pub fn mainnet() -> Self {
        Self {
            network_id: "mainnet".to_string(),
            node_url: "https://rpc.mainnet.near.org".to_string(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::testnet()
    }
}

/// Complete configuration of a mint run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MintConfig {
    /// Marketplace API base URL
    pub api_url: String,
    /// Directory containing generated images and trait files
    pub build_path: PathBuf,
    /// Token contract account receiving `nft_create_series`
    pub token_contract: String,
    /// Creator and signer account
    pub account_id: String,
    /// Collection every series belongs to
    pub collection_id: String,
    /// NEAR network settings
    pub network: NetworkConfig,
    /// Directory of the unencrypted key store
    pub credentials_dir: PathBuf,
    /// First item index (1-based, inclusive)
    pub start_index: u32,
    /// Number of items in the drop (last index, inclusive)
    pub item_count: u32,
    /// Description written to every reference document
    pub description: String,
    /// Series title prefix, followed by the item index
    pub title_prefix: String,
    /// Copies per series
    pub copies: u64,
    /// Creator royalty in basis points
    pub royalty_basis_points: u32,
    /// Gas attached to the contract call
    pub gas: u64,
    /// Deposit attached to the contract call, in yoctoNEAR
    #[serde(with = "u128_string")]
    pub deposit: u128,
    /// Upload retry policy
    pub upload_retry: RetryPolicy,
    /// Contract call retry policy
    pub mint_retry: RetryPolicy,
    /// Build documents without uploading or minting
    pub dry_run: bool,
}

impl MintConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file; missing keys keep their defaults
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_toml_file(path: &Path) -> Result<Self, ModelError> {
        let body = std::fs::read_to_string(path).map_err(|e| ModelError::io_error(path, e))?;
        toml::from_str(&body).map_err(|e| ModelError::InvalidConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// With API URL
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// With build path
    #[must_use]
    pub fn with_build_path(mut self, build_path: impl Into<PathBuf>) -> Self {
        self.build_path = build_path.into();
        self
    }

    /// With token contract
    #[must_use]
    pub fn with_token_contract(mut self, token_contract: impl Into<String>) -> Self {
        self.token_contract = token_contract.into();
        self
    }

    /// With creator account
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    /// With collection
    #[must_use]
    pub fn with_collection_id(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = collection_id.into();
        self
    }

    /// With item range
    #[must_use]
    pub fn with_range(mut self, start_index: u32, item_count: u32) -> Self {
        self.start_index = start_index;
        self.item_count = item_count;
        self
    }

    /// With retry policies
    #[must_use]
    pub fn with_retry(mut self, upload: RetryPolicy, mint: RetryPolicy) -> Self {
        self.upload_retry = upload;
        self.mint_retry = mint;
        self
    }

    /// With dry run flag
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Item indices covered by this run
    #[must_use]
    pub fn indices(&self) -> std::ops::RangeInclusive<u32> {
        self.start_index..=self.item_count
    }

    /// Check the values the run depends on
    ///
    /// # Errors
    /// Returns [`ModelError::Config`] naming the first invalid value
    pub fn validate(&self) -> Result<(), ModelError> {
        let required = [
            ("api_url", self.api_url.as_str()),
            ("token_contract", self.token_contract.as_str()),
            ("account_id", self.account_id.as_str()),
            ("collection_id", self.collection_id.as_str()),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ModelError::Config(format!("{name} must be set")));
        }
        if self.build_path.as_os_str().is_empty() {
            return Err(ModelError::Config("build_path must be set".to_string()));
        }
        if self.start_index == 0 || self.start_index > self.item_count {
            return Err(ModelError::Config(format!(
                "start index {} outside 1..={}",
                self.start_index, self.item_count
            )));
        }
        if self.royalty_basis_points > 10_000 {
            tracing::warn!(
                basis_points = self.royalty_basis_points,
                "royalty exceeds 10000 basis points, the contract will reject it"
            );
        }
        Ok(())
    }
}

impl Default for MintConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            build_path: PathBuf::new(),
            token_contract: String::new(),
            account_id: "projectp.testnet".to_string(),
            collection_id: "example-avatar-by-projectptestnet".to_string(),
            network: NetworkConfig::default(),
            credentials_dir: PathBuf::from(".near-credentials"),
            start_index: 1,
            item_count: 50,
            description: "Paras Example Avatar".to_string(),
            title_prefix: "Avatar Example".to_string(),
            copies: 1,
            royalty_basis_points: 1000,
            gas: DEFAULT_GAS,
            deposit: DEFAULT_DEPOSIT,
            upload_retry: RetryPolicy::upload(),
            mint_retry: RetryPolicy::contract_call(),
            dry_run: false,
        }
    }
}

/// yoctoNEAR amounts exceed TOML and JSON integer range; keep them as strings
mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
