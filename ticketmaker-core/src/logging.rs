//! Tracing bootstrap for hosts embedding the ticket maker.
//!
//! The library itself only emits `tracing` events; a host calls
//! [`init_logging`] once at startup to print them.
//!
//! # Invariants
//! - Initialization with the same filter is idempotent.
//! - Re-initialization with a different filter is rejected.
//! - Initialization never panics.

use anyhow::{anyhow, bail, Context, Result};
use std::sync::OnceLock;
use tracing::info;
use tracing_subscriber::EnvFilter;

static ACTIVE_FILTER: OnceLock<String> = OnceLock::new();

pub fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "ticketmaker_core=debug"
    } else {
        "ticketmaker_core=info"
    }
}

/// Installs a global `fmt` subscriber using `filter` (`EnvFilter` syntax).
pub fn init_logging(filter: &str) -> Result<()> {
    let filter = filter.trim();
    if filter.is_empty() {
        bail!("log filter cannot be empty");
    }

    if let Some(active) = ACTIVE_FILTER.get() {
        if active == filter {
            return Ok(());
        }
        bail!(
            "logging already initialized with `{}`; refusing to switch to `{}`",
            active,
            filter
        );
    }

    let env_filter =
        EnvFilter::try_new(filter).with_context(|| format!("invalid log filter `{}`", filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {}", e))?;

    let _ = ACTIVE_FILTER.set(filter.to_string());
    info!(
        filter = filter,
        version = env!("CARGO_PKG_VERSION"),
        "ticketmaker logging initialized"
    );
    Ok(())
}

/// Filter in effect, or `None` before [`init_logging`] succeeded.
pub fn logging_status() -> Option<&'static str> {
    ACTIVE_FILTER.get().map(String::as_str)
}
