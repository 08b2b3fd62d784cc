//! Testing utilities for the minter workspace
//!
//! Asset fixtures and in-memory stand-ins for the marketplace, hasher, token
//! source and token contract.

#![allow(missing_docs)]

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use minter_core::{
    AuthTokenSource, ContractError, ImageHasher, Marketplace, MintError, SeriesContract,
    SeriesMinter, Services,
};
use minter_model::{
    AssetNames, Collection, MintConfig, ReferenceDocument, RetryPolicy, SeriesParams,
};
use minter_near::AuthToken;
use minter_paras::{ParasError, UploadedMetadata};
use serde_json::json;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_ACCOUNT: &str = "projectp.testnet";
pub const TEST_COLLECTION: &str = "example-avatar-by-projectptestnet";

/// Write a small solid-colour PNG; the colour varies with `index`
pub fn write_test_image(path: &Path, index: u32) {
    let shade = u8::try_from(index % 256).unwrap();
    let image = RgbaImage::from_fn(48, 40, |x, y| {
        Rgba([shade, (x * 5) as u8, (y * 6) as u8, 255])
    });
    image.save(path).unwrap();
}

/// Write a trait file with three entries
pub fn write_test_traits(path: &Path, index: u32) {
    let body = json!({
        "background": {"name": "Background", "value": "Blue"},
        "eyes": {"name": "Eyes", "value": format!("Style {index}")},
        "level": {"name": "Level", "value": index},
    });
    std::fs::write(path, serde_json::to_string_pretty(&body).unwrap()).unwrap();
}

/// Build directory holding assets for items `1..=count`
pub fn create_build_dir(count: u32) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for index in 1..=count {
        write_item_assets(dir.path(), index);
    }
    dir
}

/// Image and trait file for one item
pub fn write_item_assets(build_path: &Path, index: u32) {
    let paths = AssetNames::for_index(index).resolve(build_path);
    write_test_image(&paths.image, index);
    write_test_traits(&paths.traits, index);
}

/// Configuration for a run over `1..=count` in `build_path` with fast retries
pub fn test_config(build_path: &Path, count: u32) -> MintConfig {
    MintConfig::new()
        .with_api_url("http://marketplace.invalid")
        .with_build_path(build_path)
        .with_token_contract("paras-token-v1.testnet")
        .with_account_id(TEST_ACCOUNT)
        .with_collection_id(TEST_COLLECTION)
        .with_range(1, count)
        .with_retry(fast_retry(10), fast_retry(100))
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(1), Duration::from_millis(2))
}

pub fn test_collection() -> Collection {
    Collection {
        collection_id: TEST_COLLECTION.to_string(),
        collection: "Example Avatar".to_string(),
    }
}

/// Recorded upload
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub image: PathBuf,
    pub token: String,
    pub reference: ReferenceDocument,
}

/// In-memory marketplace
#[derive(Debug, Default)]
pub struct FakeMarketplace {
    collection: Option<Collection>,
    fail_upload_at: Option<usize>,
    lookups: AtomicU32,
    uploads: Mutex<Vec<UploadRecord>>,
}

impl FakeMarketplace {
    pub fn with_collection(collection: Collection) -> Self {
        Self {
            collection: Some(collection),
            ..Self::default()
        }
    }

    pub fn without_collection() -> Self {
        Self::default()
    }

    /// Fail the `n`-th upload (1-based) with a 400
    pub fn failing_upload_at(mut self, n: usize) -> Self {
        self.fail_upload_at = Some(n);
        self
    }

    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Marketplace for FakeMarketplace {
    async fn find_collection(
        &self,
        _creator_id: &str,
        _collection_id: &str,
    ) -> Result<Option<Collection>, MintError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.collection.clone())
    }

    async fn upload_metadata(
        &self,
        image_path: &Path,
        auth_token: &AuthToken,
        reference: &ReferenceDocument,
    ) -> Result<UploadedMetadata, MintError> {
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(UploadRecord {
            image: image_path.to_path_buf(),
            token: auth_token.as_str().to_string(),
            reference: reference.clone(),
        });
        let n = uploads.len();
        if self.fail_upload_at == Some(n) {
            return Err(ParasError::Status {
                status: 400,
                body: "bad request".to_string(),
            }
            .into());
        }
        Ok(UploadedMetadata {
            media: format!("ipfs://media-{n}"),
            reference: format!("ipfs://reference-{n}"),
        })
    }
}

/// Hasher returning a fixed-format hash per file name
#[derive(Debug, Default)]
pub struct FakeHasher {
    calls: AtomicU32,
}

impl FakeHasher {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageHasher for FakeHasher {
    async fn hash_image(&self, path: &Path) -> Result<String, MintError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        Ok(format!("hash:{name}"))
    }
}

/// Token source numbering each token it hands out
#[derive(Debug, Default)]
pub struct CountingTokenSource {
    issued: AtomicU32,
}

impl CountingTokenSource {
    pub fn issued(&self) -> u32 {
        self.issued.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthTokenSource for CountingTokenSource {
    async fn auth_token(&self) -> Result<AuthToken, MintError> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(AuthToken::from_encoded(format!("token-{n}")))
    }
}

/// Contract answering from a script of results, then succeeding
#[derive(Debug, Default)]
pub struct ScriptedContract {
    script: Mutex<VecDeque<Result<String, ContractError>>>,
    calls: Mutex<Vec<SeriesParams>>,
}

impl ScriptedContract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue failures with the given message
    pub fn fail_times(self, times: usize, message: &str) -> Self {
        {
            let mut script = self.script.lock().unwrap();
            for _ in 0..times {
                script.push_back(Err(ContractError::new(message)));
            }
        }
        self
    }

    /// Queue one success
    pub fn then_succeed(self) -> Self {
        let n = self.script.lock().unwrap().len() + 1;
        self.script.lock().unwrap().push_back(Ok(format!("tx-scripted-{n}")));
        self
    }

    pub fn calls(&self) -> Vec<SeriesParams> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SeriesContract for ScriptedContract {
    async fn create_series(
        &self,
        params: &SeriesParams,
        _gas: u64,
        _deposit: u128,
    ) -> Result<String, ContractError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(params.clone());
        let n = calls.len();
        drop(calls);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("tx-{n}")))
    }
}

/// Fakes behind a set of [`Services`]
pub struct FakeServices {
    pub marketplace: Arc<FakeMarketplace>,
    pub hasher: Arc<FakeHasher>,
    pub tokens: Arc<CountingTokenSource>,
    pub contract: Arc<ScriptedContract>,
}

impl FakeServices {
    pub fn new(marketplace: FakeMarketplace, contract: ScriptedContract) -> Self {
        Self {
            marketplace: Arc::new(marketplace),
            hasher: Arc::new(FakeHasher::default()),
            tokens: Arc::new(CountingTokenSource::default()),
            contract: Arc::new(contract),
        }
    }

    pub fn services(&self, config: &MintConfig) -> Services {
        Services {
            marketplace: self.marketplace.clone(),
            hasher: self.hasher.clone(),
            tokens: self.tokens.clone(),
            minter: SeriesMinter::new(
                self.contract.clone(),
                config.mint_retry,
                config.gas,
                config.deposit,
            ),
        }
    }
}
