//! Minter NEAR - account access for the series minter
//!
//! - [`key_store`]: credentials on disk or in memory
//! - [`signer`]: message signing on behalf of an account
//! - [`auth`]: marketplace bearer tokens derived from a signature
//! - [`contract`]: change-method calls through `near-workspaces`
//!
//! # Example
//!
//! ```rust,ignore
//! use minter_near::{generate_auth_token, FileKeyStore, InMemorySigner};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = FileKeyStore::new("/home/me/.near-credentials");
//! let signer = InMemorySigner::new(Arc::new(store));
//! let token = generate_auth_token("projectp.testnet", &signer, "testnet").await?;
//! println!("Authorization: {}", token.as_str());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod auth;
pub mod contract;
pub mod error;
pub mod key_store;
pub mod signer;

pub use auth::{generate_auth_token, AuthToken, AuthTokenParts};
pub use contract::{CallOutcome, ContractClient};
pub use error::{AuthError, KeyStoreError, RpcError, SignerError};
pub use key_store::{FileKeyStore, InMemoryKeyStore, KeyPair, KeyStore, PublicKey};
pub use signer::{InMemorySigner, MessageSigner, SignedMessage};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
