//! Subcommand implementations.

pub mod init;
pub mod run;
pub mod status;

use std::path::Path;

use anyhow::{Context, Result};
use reporter_core::{config, ReporterConfig};

/// Resolve and load the config for a command.
pub(crate) fn load_config(explicit: Option<&Path>) -> Result<ReporterConfig> {
    let path = config::resolve_path(explicit).context("could not locate config file")?;
    config::load_at(&path).with_context(|| format!("failed to load config '{}'", path.display()))
}
