//! Minter Paras - marketplace API client
//!
//! - Collection lookup used to check the target collection exists
//! - Multipart upload of an image and its reference document, returning
//!   content locators
//!
//! # Example
//!
//! ```rust,ignore
//! use minter_paras::ParasClient;
//! use minter_model::RetryPolicy;
//!
//! # async fn example(token: minter_near::AuthToken, doc: minter_model::ReferenceDocument) -> Result<(), Box<dyn std::error::Error>> {
//! let client = ParasClient::new("https://api-v2-testnet.paras.id", RetryPolicy::upload())?;
//! let uploaded = client
//!     .upload_metadata("build/paras-avatar_0001_large.png".as_ref(), &token, &doc)
//!     .await?;
//! println!("{} {}", uploaded.media_hash(), uploaded.reference_hash());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod client;
pub mod error;
pub mod upload;

pub use client::ParasClient;
pub use error::ParasError;
pub use upload::{UploadedMetadata, REFERENCE_FILE_NAME, REFERENCE_MIME};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
