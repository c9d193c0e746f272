//! # Structured Logging
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` (from
//! `RUST_LOG`, or the configured level when unset) and either pretty or
//! JSON output on stderr. Stdout is left for command output such as the
//! `encode` subcommand's hex dump.

use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, colored output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Initialize the global tracing subscriber. Call once, early in `main()`.
///
/// `default_level` is any `EnvFilter` directive string, e.g. `"info"` or
/// `"strata_node=debug,strata_protocol=info"`. `RUST_LOG` wins when set.
pub fn init_logging(default_level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }

    tracing::debug!(?format, "logging initialized");
}

/// Turns a bare level such as `info` into a filter scoped to our crates, so
/// dependencies (sled in particular) stay quiet. Full directive strings pass
/// through untouched.
pub fn default_directives(level: &str) -> String {
    if level.contains('=') || level.contains(',') {
        level.to_string()
    } else {
        format!("strata_node={level},strata_protocol={level},warn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_strata() {
        assert_eq!(
            default_directives("debug"),
            "strata_node=debug,strata_protocol=debug,warn"
        );
    }

    #[test]
    fn directives_pass_through() {
        assert_eq!(default_directives("sled=trace"), "sled=trace");
        assert_eq!(default_directives("info,sled=warn"), "info,sled=warn");
    }

    #[test]
    fn format_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            format: LogFormat,
        }
        let w: Wrapper = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(w.format, LogFormat::Json);
    }
}
