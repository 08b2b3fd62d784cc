//! Command line definition and configuration layering
//!
//! Precedence, lowest first: built-in defaults, `--config` TOML file,
//! environment variables, flags.

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use minter_model::{MintConfig, NetworkConfig};
use std::path::PathBuf;

/// Log output options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            json: false,
            default_filter: "info".to_string(),
        }
    }
}

/// Everything a run needs, resolved from the command line
#[derive(Debug, Clone)]
pub struct CliOptions {
    /// Mint configuration
    pub config: MintConfig,
    /// Log output
    pub log: LogOptions,
}

/// Build the `paras-minter` command
#[must_use]
pub fn command() -> Command {
    Command::new("paras-minter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Upload generated avatars to Paras and register one series per item")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with run configuration"),
        )
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .env("PARAS_API_URL")
                .help("Paras API base URL"),
        )
        .arg(
            Arg::new("build-path")
                .long("build-path")
                .env("BUILD_PATH")
                .value_parser(value_parser!(PathBuf))
                .help("Directory with generated images and trait files"),
        )
        .arg(
            Arg::new("token-contract")
                .long("token-contract")
                .env("PARAS_TOKEN_CONTRACT")
                .help("Token contract receiving nft_create_series"),
        )
        .arg(
            Arg::new("account-id")
                .long("account-id")
                .env("NEAR_ACCOUNT_ID")
                .help("Creator and signer account"),
        )
        .arg(
            Arg::new("collection-id")
                .long("collection-id")
                .env("PARAS_COLLECTION_ID")
                .help("Collection every series is added to"),
        )
        .arg(
            Arg::new("network")
                .long("network")
                .env("NEAR_NETWORK")
                .help("NEAR network id (testnet, mainnet or custom)"),
        )
        .arg(
            Arg::new("node-url")
                .long("node-url")
                .env("NEAR_NODE_URL")
                .help("NEAR JSON-RPC endpoint"),
        )
        .arg(
            Arg::new("credentials-dir")
                .long("credentials-dir")
                .env("NEAR_CREDENTIALS_DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Key store root (default: $HOME/.near-credentials)"),
        )
        .arg(
            Arg::new("start")
                .long("start")
                .value_parser(value_parser!(u32))
                .help("First item index, for resuming a partial run"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .value_parser(value_parser!(u32))
                .help("Last item index (inclusive)"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Hash images and build documents without uploading or minting"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
}

/// Resolve parsed arguments into run options
///
/// # Errors
/// Returns error if the config file cannot be loaded or a network is given
/// without a node URL
pub fn options_from_matches(matches: &ArgMatches) -> anyhow::Result<CliOptions> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => MintConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MintConfig::default(),
    };
    let default_credentials = MintConfig::default().credentials_dir;

    if let Some(url) = matches.get_one::<String>("api-url") {
        config = config.with_api_url(url);
    }
    if let Some(path) = matches.get_one::<PathBuf>("build-path") {
        config = config.with_build_path(path);
    }
    if let Some(contract) = matches.get_one::<String>("token-contract") {
        config = config.with_token_contract(contract);
    }
    if let Some(account) = matches.get_one::<String>("account-id") {
        config = config.with_account_id(account);
    }
    if let Some(collection) = matches.get_one::<String>("collection-id") {
        config = config.with_collection_id(collection);
    }

    let node_url = matches.get_one::<String>("node-url");
    if let Some(network) = matches.get_one::<String>("network") {
        config.network = match network.as_str() {
            "testnet" => NetworkConfig::testnet(),
            "mainnet" => NetworkConfig::mainnet(),
            other if node_url.is_some() => NetworkConfig {
                network_id: other.to_string(),
                node_url: String::new(),
            },
            other => bail!("network '{other}' needs --node-url"),
        };
    }
    if let Some(url) = node_url {
        config.network.node_url.clone_from(url);
    }

    match matches.get_one::<PathBuf>("credentials-dir") {
        Some(dir) => config.credentials_dir.clone_from(dir),
        None if config.credentials_dir == default_credentials => {
            if let Some(home) = std::env::var_os("HOME") {
                config.credentials_dir = PathBuf::from(home).join(&default_credentials);
            }
        }
        None => {}
    }

    if matches.contains_id("start") || matches.contains_id("count") {
        let start = matches.get_one::<u32>("start").copied().unwrap_or(config.start_index);
        let count = matches.get_one::<u32>("count").copied().unwrap_or(config.item_count);
        config = config.with_range(start, count);
    }
    if matches.get_flag("dry-run") {
        config = config.with_dry_run(true);
    }

    let log = LogOptions {
        json: matches.get_flag("log-json"),
        ..LogOptions::default()
    };

    Ok(CliOptions { config, log })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn parse(args: &[&str]) -> anyhow::Result<CliOptions> {
        let mut argv = vec!["paras-minter"];
        argv.extend_from_slice(args);
        let matches = command().try_get_matches_from(argv)?;
        options_from_matches(&matches)
    }

    #[test]
    fn command_definition_is_valid() {
        command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let opts = parse(&[
            "--api-url",
            "https://api-v2-testnet.paras.id",
            "--build-path",
            "/tmp/build",
            "--token-contract",
            "paras-token-v1.testnet",
            "--start",
            "12",
            "--credentials-dir",
            "/keys",
            "--dry-run",
            "--log-json",
        ])
        .unwrap();

        assert_eq!(opts.config.api_url, "https://api-v2-testnet.paras.id");
        assert_eq!(opts.config.build_path, PathBuf::from("/tmp/build"));
        assert_eq!(opts.config.token_contract, "paras-token-v1.testnet");
        assert_eq!(opts.config.indices(), 12..=50);
        assert_eq!(opts.config.credentials_dir, PathBuf::from("/keys"));
        assert!(opts.config.dry_run);
        assert!(opts.log.json);
    }

    #[test]
    fn mainnet_switches_node_url() {
        let opts = parse(&["--network", "mainnet", "--credentials-dir", "/keys"]).unwrap();
        assert_eq!(opts.config.network, NetworkConfig::mainnet());
    }

    #[test]
    fn custom_network_requires_node_url() {
        assert!(parse(&["--network", "localnet", "--credentials-dir", "/keys"]).is_err());

        let opts = parse(&[
            "--network",
            "localnet",
            "--node-url",
            "http://127.0.0.1:3030",
            "--credentials-dir",
            "/keys",
        ])
        .unwrap();
        assert_eq!(opts.config.network.network_id, "localnet");
        assert_eq!(opts.config.network.node_url, "http://127.0.0.1:3030");
    }

    #[test]
    fn flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
api_url = "http://from-file"
token_contract = "file-contract.testnet"
item_count = 20
"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let opts = parse(&[
            "--config",
            path,
            "--token-contract",
            "flag-contract.testnet",
            "--credentials-dir",
            "/keys",
        ])
        .unwrap();

        assert_eq!(opts.config.api_url, "http://from-file");
        assert_eq!(opts.config.token_contract, "flag-contract.testnet");
        assert_eq!(opts.config.indices(), 1..=20);
    }

    #[test]
    fn rejects_non_numeric_start() {
        assert!(parse(&["--start", "first"]).is_err());
    }
}
