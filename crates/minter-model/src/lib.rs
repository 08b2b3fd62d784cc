//! Minter Model - shared types for the Paras series minter
//!
//! Everything the pipeline stages pass between each other lives here:
//! - Asset naming for the generated avatar files
//! - Reference documents, token metadata and series parameters
//! - Mint configuration (the former module-level constants)
//! - Retry policies and the async retry driver
//!
//! # Example
//!
//! ```rust,ignore
//! use minter_model::{AssetNames, MintConfig};
//!
//! let config = MintConfig::default().with_build_path("/tmp/build");
//! let names = AssetNames::for_index(7);
//! assert_eq!(names.image, "paras-avatar_0007_large.png");
//! let paths = names.resolve(&config.build_path);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod document;
pub mod error;
pub mod naming;
pub mod retry;

pub use config::{MintConfig, NetworkConfig};
pub use document::{
    load_attributes, parse_attributes, Attribute, Collection, ReferenceDocument, Royalty,
    SeriesParams, TokenMetadata,
};
pub use error::ModelError;
pub use naming::{pad_index, AssetNames, AssetPaths};
pub use retry::{retry, RetryError, RetryPolicy, Retryable};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
