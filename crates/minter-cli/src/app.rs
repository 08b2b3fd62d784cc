//! Wiring of production services and process-level concerns

use crate::args::{CliOptions, LogOptions};
use anyhow::Context;
use minter_core::{
    BlurhashHasher, MintError, NearSeriesContract, Orchestrator, RunSummary, SeriesMinter,
    Services, SignerTokenSource,
};
use minter_model::MintConfig;
use minter_near::{ContractClient, FileKeyStore, InMemorySigner, MessageSigner};
use minter_paras::ParasClient;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the default filter.
pub fn init_tracing(options: &LogOptions) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&options.default_filter));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if options.json {
        fmt.json().init();
    } else {
        fmt.init();
    }
}

/// Services backed by the Paras API, the NEAR node and the file key store
///
/// Nothing connects here; the NEAR client connects on its first call.
///
/// # Errors
/// Returns error if an HTTP client cannot be built
pub fn production_services(config: &MintConfig) -> anyhow::Result<Services> {
    let key_store = FileKeyStore::new(&config.credentials_dir);
    let network_id = &config.network.network_id;
    let credentials_file = key_store.key_path(network_id, &config.account_id);
    let signer: Arc<dyn MessageSigner> = Arc::new(InMemorySigner::new(Arc::new(key_store)));

    let marketplace = ParasClient::new(&config.api_url, config.upload_retry)
        .context("building marketplace client")?;
    let client = ContractClient::new(
        network_id,
        &config.network.node_url,
        &config.account_id,
        credentials_file,
    );
    let contract = NearSeriesContract::new(client, &config.token_contract);

    Ok(Services {
        marketplace: Arc::new(marketplace),
        hasher: Arc::new(BlurhashHasher),
        tokens: Arc::new(SignerTokenSource::new(signer, &config.account_id, network_id)),
        minter: SeriesMinter::new(Arc::new(contract), config.mint_retry, config.gas, config.deposit),
    })
}

/// Run the configured mint
///
/// # Errors
/// Returns the pipeline error, or a setup error with context
pub async fn run(options: CliOptions) -> anyhow::Result<RunSummary> {
    let config = options.config;
    tracing::info!(
        account_id = %config.account_id,
        collection_id = %config.collection_id,
        token_contract = %config.token_contract,
        network = %config.network.network_id,
        start = config.start_index,
        count = config.item_count,
        dry_run = config.dry_run,
        "starting mint run"
    );

    let services = production_services(&config)?;
    let summary = Orchestrator::new(config, services).run().await?;
    Ok(summary)
}

/// Exit code for a failed run
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    let code = err.downcast_ref::<MintError>().map_or(1, MintError::exit_code);
    u8::try_from(code).unwrap_or(1)
}
