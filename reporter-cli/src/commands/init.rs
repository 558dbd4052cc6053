//! `reporter init --remote-folder <name> --local-folder <path> --template <nb>`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use reporter_core::{config, ExitCodePolicy, NamingStrategy, ReporterConfig, SelectionPolicy};

use super::super::{ExitCodesArg, NamingArg};

/// Write a config file for the report pipeline.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Folder inside the rclone remote that receives spreadsheet uploads.
    #[arg(long)]
    pub remote_folder: String,

    /// Local directory mirroring the remote folder.
    #[arg(long)]
    pub local_folder: PathBuf,

    /// Parameterized notebook executed for each new report.
    #[arg(long)]
    pub template: PathBuf,

    /// rclone remote name. Defaults to "remote".
    #[arg(long)]
    pub remote_name: Option<String>,

    /// Directory for executed notebooks and HTML reports. Defaults to ".".
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// Base-name rule: first-dot (default) | strip-extension.
    #[arg(long, value_name = "STRATEGY")]
    pub naming: Option<NamingArg>,

    /// Exit-code handling: lenient (default) | strict.
    #[arg(long, value_name = "POLICY")]
    pub exit_codes: Option<ExitCodesArg>,

    /// Process every new report per run instead of only the first.
    #[arg(long)]
    pub all: bool,

    /// Overwrite an existing config file.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let path = config::resolve_path(config_path).context("could not locate config file")?;
        let force = self.force;
        let cfg = self.into_config();
        config::init_at(&path, &cfg, force)
            .with_context(|| format!("failed to write config '{}'", path.display()))?;

        println!("✓ Wrote config to {}", path.display());
        println!("  remote: {}", cfg.remote_spec());
        println!("  local:  {}", cfg.local_folder.display());
        Ok(())
    }

    fn into_config(self) -> ReporterConfig {
        let mut cfg = ReporterConfig::new(self.remote_folder, self.local_folder, self.template);
        if let Some(name) = self.remote_name {
            cfg.remote_name = name;
        }
        if let Some(dir) = self.work_dir {
            cfg.work_dir = dir;
        }
        cfg.naming = self.naming.map(NamingStrategy::from).unwrap_or_default();
        cfg.exit_codes = self.exit_codes.map(ExitCodePolicy::from).unwrap_or_default();
        cfg.selection = if self.all {
            SelectionPolicy::All
        } else {
            SelectionPolicy::First
        };
        cfg
    }
}
