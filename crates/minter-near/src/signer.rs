//! Message signing
//!
//! [`InMemorySigner`] signs `sha256(message)` with the account key, which is
//! what the marketplace expects when it verifies an auth token.

use crate::error::SignerError;
use crate::key_store::{KeyStore, PublicKey};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Signature over a message together with the key that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    /// Signer public key
    pub public_key: PublicKey,
    /// ed25519 signature bytes
    pub signature: [u8; 64],
}

/// Capability to sign arbitrary bytes on behalf of an account
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Sign `message` as `account_id` on `network_id`
    async fn sign_message(
        &self,
        message: &[u8],
        account_id: &str,
        network_id: &str,
    ) -> Result<SignedMessage, SignerError>;
}

/// Signer backed by a key store
#[derive(Clone)]
pub struct InMemorySigner {
    key_store: Arc<dyn KeyStore>,
}

impl InMemorySigner {
    /// Create signer over a key store
    #[inline]
    #[must_use]
    pub fn new(key_store: Arc<dyn KeyStore>) -> Self {
        Self { key_store }
    }
}

impl std::fmt::Debug for InMemorySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySigner").finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageSigner for InMemorySigner {
    async fn sign_message(
        &self,
        message: &[u8],
        account_id: &str,
        network_id: &str,
    ) -> Result<SignedMessage, SignerError> {
        let digest = Sha256::digest(message);
        let pair = self.key_store.get_key(network_id, account_id).await?;
        Ok(SignedMessage {
            public_key: pair.public_key(),
            signature: pair.sign(&digest),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_store::{InMemoryKeyStore, KeyPair};
    use ed25519_dalek::{Signature, SigningKey, Verifier};
    use rand::rngs::OsRng;

    #[tokio::test]
    async fn signs_sha256_of_message() {
        let pair = KeyPair::new(SigningKey::generate(&mut OsRng));
        let mut store = InMemoryKeyStore::new();
        store.set_key("testnet", "alice.testnet", pair.clone());
        let signer = InMemorySigner::new(Arc::new(store));

        let signed = signer
            .sign_message(b"alice.testnet", "alice.testnet", "testnet")
            .await
            .unwrap();

        assert_eq!(signed.public_key, pair.public_key());
        let digest = Sha256::digest(b"alice.testnet");
        let signature = Signature::from_bytes(&signed.signature);
        assert!(pair.verifying_key().verify(&digest, &signature).is_ok());
    }

    #[tokio::test]
    async fn unknown_account_fails() {
        let signer = InMemorySigner::new(Arc::new(InMemoryKeyStore::new()));
        let err = signer
            .sign_message(b"bob.testnet", "bob.testnet", "testnet")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bob.testnet"));
    }
}
