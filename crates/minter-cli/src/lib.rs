//! paras-minter command line
//!
//! Resolves configuration from defaults, an optional TOML file, environment
//! variables and flags, installs logging, and runs the mint orchestrator
//! against the Paras API and a NEAR node.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod app;
pub mod args;

pub use app::{exit_code_for, init_tracing, production_services, run};
pub use args::{command, options_from_matches, CliOptions, LogOptions};
