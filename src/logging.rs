//! Tracing setup. Inside an inventory, logs go to `netmap/netmap.log` so
//! they never draw over the terminal UI.

use std::fs::OpenOptions;
use std::path::Path;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::parser::config::{self, DEFAULT_LOG_FILTER};
use crate::workspace;

const STDERR_FILTER: &str = "warn";

/// Install the global subscriber. `root` is the inventory root, if one was
/// found; without it only warnings are printed to stderr.
pub fn init(root: Option<&Path>) -> Result<()> {
    let Some(root) = root else {
        tracing_subscriber::registry()
            .with(filter(None, STDERR_FILTER))
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .try_init()?;
        return Ok(());
    };

    // A broken config is reported by the command that reads it.
    let configured = config::load(&workspace::config_path(root))
        .map(|c| c.log_filter)
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

    let log_path = workspace::log_path(root);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    tracing_subscriber::registry()
        .with(filter(std::env::var("RUST_LOG").ok(), &configured))
        .with(
            fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()?;
    tracing::debug!(path = %log_path.display(), "logging initialised");
    Ok(())
}

/// `RUST_LOG` wins over the configured directive when it parses.
fn filter(env: Option<String>, fallback: &str) -> EnvFilter {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_directive_overrides_fallback() {
        assert_eq!(filter(Some("debug".to_string()), "info").to_string(), "debug");
        assert_eq!(filter(None, "netmap=trace").to_string(), "netmap=trace");
    }

    #[test]
    fn unparsable_env_directive_falls_back() {
        assert_eq!(filter(Some("netmap=loud".to_string()), "warn").to_string(), "warn");
    }
}
