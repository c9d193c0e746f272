//! # Node Configuration
//!
//! Loads `NodeConfig` from an optional TOML file. Every field has a default,
//! so an empty (or absent) file is a valid configuration. CLI flags are
//! applied on top by the caller.
//!
//! ```toml
//! data_dir = "data"
//! hash = "sha256"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//!
//! [total_order]
//! name = "default"
//! kind = "in-process"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use strata_protocol::config::DEFAULT_DATA_DIR;
use strata_protocol::crypto::HashAlgorithm;

use crate::logging::LogFormat;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeConfig {
    /// Where the sled database lives. Relative paths in a config file are
    /// taken relative to that file.
    pub data_dir: PathBuf,
    pub hash: HashAlgorithm,
    pub logging: LoggingConfig,
    pub total_order: TotalOrderConfig,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            hash: HashAlgorithm::Sha256,
            logging: LoggingConfig::default(),
            total_order: TotalOrderConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TotalOrderConfig {
    pub name: String,
    pub kind: String,
}

impl Default for TotalOrderConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            kind: TOTAL_ORDER_IN_PROCESS.to_string(),
        }
    }
}

/// The only total-order backend this node can run.
pub const TOTAL_ORDER_IN_PROCESS: &str = "in-process";

impl NodeConfig {
    /// Reads `path` if given. A missing file is not an error; a file that
    /// exists but doesn't parse is.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;

        if config.data_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.data_dir = parent.join(&config.data_dir);
            }
        }
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<()> {
        if self.total_order.kind != TOTAL_ORDER_IN_PROCESS {
            bail!(
                "unsupported total order kind {:?} (only {:?} is available)",
                self.total_order.kind,
                TOTAL_ORDER_IN_PROCESS
            );
        }
        Ok(())
    }
}
