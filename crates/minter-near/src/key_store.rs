//! Account keys
//!
//! [`FileKeyStore`] reads the unencrypted credentials directory written by the
//! NEAR CLI: `{root}/{network_id}/{account_id}.json`.

use crate::error::KeyStoreError;
use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

const ED25519_PREFIX: &str = "ed25519:";

/// ed25519 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

impl PublicKey {
    /// Raw key bytes
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Parse `ed25519:<base58>`
    ///
    /// # Errors
    /// Returns error on a wrong prefix, bad base58 or wrong length
    pub fn parse(s: &str) -> Result<Self, KeyStoreError> {
        let bytes = decode_prefixed(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| KeyStoreError::InvalidKey(format!("public key length {}", b.len())))?;
        Ok(Self(arr))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ED25519_PREFIX}{}", bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({self})")
    }
}

/// ed25519 key pair of an account
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Wrap an existing signing key
    #[inline]
    #[must_use]
    pub fn new(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Parse `ed25519:<base58>` holding a 32-byte seed or 64-byte secret‖public
    ///
    /// # Errors
    /// Returns error on a malformed key or a public half that does not match
    pub fn from_secret_str(s: &str) -> Result<Self, KeyStoreError> {
        let bytes = decode_prefixed(s)?;
        let signing_key = match bytes.len() {
            32 | 64 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes[..32]);
                SigningKey::from_bytes(&seed)
            }
            n => return Err(KeyStoreError::InvalidKey(format!("secret key length {n}"))),
        };
        if bytes.len() == 64 && signing_key.verifying_key().as_bytes()[..] != bytes[32..] {
            return Err(KeyStoreError::InvalidKey(
                "public half does not match secret".to_string(),
            ));
        }
        Ok(Self { signing_key })
    }

    /// Public key of the pair
    #[must_use]
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Verifying key of the pair
    #[must_use]
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign raw bytes
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

fn decode_prefixed(s: &str) -> Result<Vec<u8>, KeyStoreError> {
    let encoded = s
        .strip_prefix(ED25519_PREFIX)
        .ok_or_else(|| KeyStoreError::InvalidKey(format!("missing '{ED25519_PREFIX}' prefix")))?;
    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| KeyStoreError::InvalidKey(e.to_string()))
}

/// Source of account keys
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Key pair of `account_id` on `network_id`
    async fn get_key(&self, network_id: &str, account_id: &str) -> Result<KeyPair, KeyStoreError>;
}

#[derive(Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    account_id: Option<String>,
    #[serde(default)]
    public_key: Option<String>,
    private_key: String,
}

/// Unencrypted on-disk key store
#[derive(Debug, Clone)]
pub struct FileKeyStore {
    root: PathBuf,
}

impl FileKeyStore {
    /// Key store rooted at a credentials directory
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Credentials file path for an account
    #[must_use]
    pub fn key_path(&self, network_id: &str, account_id: &str) -> PathBuf {
        self.root.join(network_id).join(format!("{account_id}.json"))
    }
}

#[async_trait]
impl KeyStore for FileKeyStore {
    async fn get_key(&self, network_id: &str, account_id: &str) -> Result<KeyPair, KeyStoreError> {
        let path = self.key_path(network_id, account_id);
        let body = match tokio::fs::read_to_string(&path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(KeyStoreError::KeyNotFound {
                    network_id: network_id.to_string(),
                    account_id: account_id.to_string(),
                })
            }
            Err(source) => return Err(KeyStoreError::Io { path, source }),
        };

        let file: CredentialsFile =
            serde_json::from_str(&body).map_err(|e| KeyStoreError::InvalidFile {
                path: path.clone(),
                message: e.to_string(),
            })?;

        if let Some(stored) = file.account_id.as_deref() {
            if stored != account_id {
                tracing::warn!(path = %path.display(), stored, account_id, "credentials file names another account");
            }
        }

        let pair = KeyPair::from_secret_str(&file.private_key)?;
        if let Some(public) = file.public_key.as_deref() {
            if PublicKey::parse(public)? != pair.public_key() {
                return Err(KeyStoreError::InvalidFile {
                    path,
                    message: "public_key does not match private_key".to_string(),
                });
            }
        }
        Ok(pair)
    }
}

/// Key store held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryKeyStore {
    keys: HashMap<(String, String), KeyPair>,
}

impl InMemoryKeyStore {
    /// Empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a key pair
    pub fn set_key(&mut self, network_id: &str, account_id: &str, key: KeyPair) {
        self.keys
            .insert((network_id.to_string(), account_id.to_string()), key);
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn get_key(&self, network_id: &str, account_id: &str) -> Result<KeyPair, KeyStoreError> {
        self.keys
            .get(&(network_id.to_string(), account_id.to_string()))
            .cloned()
            .ok_or_else(|| KeyStoreError::KeyNotFound {
                network_id: network_id.to_string(),
                account_id: account_id.to_string(),
            })
    }
}
