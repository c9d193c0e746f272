//! # CLI Interface
//!
//! Command-line structure for `strata-node`, using `clap` derive. Three
//! subcommands: `run`, `encode` and `version`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Strata ledger node.
///
/// Runs a single-node ledger: a transaction repository and an in-process
/// total-order log on one sled database.
#[derive(Parser, Debug)]
#[command(
    name = "strata-node",
    about = "Strata ledger node",
    version,
    propagate_version = true
)]
pub struct StrataNodeCli {
    /// Path to the node configuration file (TOML). Missing file means
    /// defaults.
    #[arg(long, short = 'c', global = true, env = "STRATA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level or `EnvFilter` directives. Overrides the config file.
    #[arg(long, global = true, env = "STRATA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format. Overrides the config file.
    #[arg(long, global = true, value_enum, env = "STRATA_LOG_FORMAT")]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the node and run until Ctrl+C / SIGTERM.
    Run(RunArgs),
    /// Print the ID and canonical encoding of a transaction given as JSON.
    Encode(EncodeArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Database directory. Created on first run. Overrides the config file.
    #[arg(long, short = 'd', env = "STRATA_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// JSON transaction file. Byte fields are hex strings.
    #[arg(long, short = 'f')]
    pub file: PathBuf,

    /// Hash algorithm for the ID. Overrides the config file.
    #[arg(long)]
    pub hash: Option<String>,
}
