// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Strata Node
//!
//! Entry point for the `strata-node` binary. Loads configuration, sets up
//! logging and dispatches to a subcommand:
//!
//! - `run`     - open the ledger and the total-order log, serve until Ctrl+C
//! - `encode`  - print a JSON transaction's ID and canonical encoding
//! - `version` - print build version information

mod cli;
mod config;
mod encode;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use strata_protocol::storage::{LedgerDb, TransactionRepository};
use strata_protocol::submit::Namespace;
use strata_protocol::totalorder::{InProcessSequencer, TotalOrderStore};
use strata_protocol::validator::SignatureValidator;

use cli::{Commands, StrataNodeCli};
use config::NodeConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = StrataNodeCli::parse();
    let mut config = NodeConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    match cli.command {
        Commands::Run(args) => {
            if let Some(dir) = args.data_dir {
                config.data_dir = dir;
            }
            logging::init_logging(
                &logging::default_directives(&config.logging.level),
                config.logging.format,
            );
            run_node(config).await
        }
        Commands::Encode(args) => {
            if let Some(hash) = args.hash {
                config.hash = hash
                    .parse()
                    .with_context(|| format!("invalid --hash {hash:?}"))?;
            }
            logging::init_logging(
                &logging::default_directives(&config.logging.level),
                config.logging.format,
            );
            encode_transaction(&config, &args.file)
        }
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Opens storage, wires the commit pipeline and the sequencer, and waits
/// for a shutdown signal.
async fn run_node(config: NodeConfig) -> Result<()> {
    tracing::info!(
        data_dir = %config.data_dir.display(),
        hash = %config.hash,
        total_order = %config.total_order.name,
        "starting strata-node"
    );

    // --- Persistent storage ---
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "failed to create data directory: {}",
            config.data_dir.display()
        )
    })?;
    let db = LedgerDb::open(&config.data_dir)
        .with_context(|| format!("failed to open database at {}", config.data_dir.display()))?;
    tracing::info!(path = %config.data_dir.display(), "database opened");

    // --- Ledger ---
    let repo = Arc::new(TransactionRepository::new(
        Arc::new(db.ledger()),
        config.hash,
    ));
    let namespace = Namespace::new(
        config.total_order.name.clone(),
        config.hash,
        repo,
        Arc::new(SignatureValidator::new()),
    );

    // --- Total order ---
    let store = Arc::new(
        TotalOrderStore::open(Arc::new(db.total_order()), config.hash)
            .context("failed to recover the total-order log")?,
    );
    tracing::info!(
        next_sequence = store.next_sequence(),
        accumulator = %hex::encode(store.accumulator()),
        "total-order log recovered"
    );
    let sequencer = InProcessSequencer::start(Arc::clone(&store));

    tracing::info!(namespace = namespace.name(), "strata-node ready");

    shutdown_signal().await;
    tracing::info!("shutdown signal received");

    sequencer.shutdown().await;
    let flushed = db.flush().context("failed to flush database")?;
    tracing::info!(bytes = flushed, "strata-node stopped");
    Ok(())
}

/// Reads a JSON transaction and prints its ID and canonical encoding as hex.
fn encode_transaction(config: &NodeConfig, path: &std::path::Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let tx = encode::transaction_from_json(config.hash, &raw)
        .with_context(|| format!("failed to encode {}", path.display()))?;

    tracing::debug!(txid = %tx.id, outputs = tx.outputs.len(), "encoded transaction");
    println!("id      {}", tx.id);
    println!("encoded {}", hex::encode(&tx.encoded));
    Ok(())
}

fn print_version() {
    println!("strata-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol    {}", strata_protocol::config::PROTOCOL_VERSION);
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first. If a
/// handler can't be installed, that signal is never observed.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
