//! Minter Core - the series minting pipeline
//!
//! For each item in the configured range:
//! 1. Hash the image (blurhash)
//! 2. Generate a fresh marketplace auth token
//! 3. Build and upload the reference document with the image
//! 4. Register the series on the token contract, retrying transient failures
//!
//! Stages are reached through the traits in [`services`], so the loop can run
//! against fakes in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use minter_core::{Orchestrator, Services};
//!
//! # async fn example(config: minter_model::MintConfig, services: Services) -> Result<(), minter_core::MintError> {
//! let summary = Orchestrator::new(config, services).run().await?;
//! for item in &summary.minted {
//!     println!("{} {:?}", item.title, item.tx_hash);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod minter;
pub mod orchestrator;
pub mod services;

pub use error::{ContractError, ContractErrorKind, MintError, TRANSIENT_PATTERNS};
pub use minter::SeriesMinter;
pub use orchestrator::{MintedSeries, Orchestrator, RunSummary, Services, DRY_RUN_HASH};
pub use services::{
    AuthTokenSource, BlurhashHasher, ImageHasher, Marketplace, NearSeriesContract, SeriesContract,
    SignerTokenSource, CREATE_SERIES_METHOD,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
