//! Tracing setup.
//!
//! The wizard owns the terminal, so log lines go to a file. The filter comes
//! from `KYC_LOG`, falling back to [`Defaults::LOG_FILTER`].

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::defaults::Defaults;

fn filter() -> EnvFilter {
    EnvFilter::try_from_env("KYC_LOG").unwrap_or_else(|_| EnvFilter::new(Defaults::LOG_FILTER))
}

/// Append log lines to `path`. Call once per process.
pub fn init_file(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;
    Ok(())
}

/// Log to stderr, for the headless commands where stdout carries the result.
pub fn init_stderr() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;
    Ok(())
}
