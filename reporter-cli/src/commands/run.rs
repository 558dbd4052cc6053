//! `reporter run`: detect new reports, execute, render and publish them.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use reporter_core::{ArtifactChain, SelectionPolicy, SystemRunner};
use reporter_sync::{Pipeline, RunOutcome};

use super::load_config;

/// Arguments for `reporter run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Detect and plan only; do not sync, execute, render or publish.
    #[arg(long)]
    pub dry_run: bool,

    /// Process every new report instead of the configured selection.
    #[arg(long)]
    pub all: bool,

    /// Emit the run outcome as JSON.
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let runner = SystemRunner;

        let mut pipeline = Pipeline::new(&config, &runner).dry_run(self.dry_run);
        if self.all {
            pipeline = pipeline.selection(SelectionPolicy::All);
        }

        if !self.json {
            println!("Starting updater..");
        }
        let outcome = pipeline
            .run()
            .with_context(|| format!("report run failed for '{}'", config.remote_spec()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome).context("failed to serialize run JSON")?
            );
            return Ok(());
        }

        print_outcome(&outcome);
        Ok(())
    }
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::UpToDate => println!("Everything is synced. No new files."),
        RunOutcome::Planned { new_files, reports } => {
            println!("[dry-run] {} new file(s) on the remote", new_files.len());
            print_reports("[dry-run] would publish", reports);
        }
        RunOutcome::Processed(summary) => {
            println!("{} new file(s) on the remote", summary.new_files.len());
            print_reports("✓ Report published", &summary.reports);
            let elapsed = summary.finished_at - summary.started_at;
            println!(
                "Updater finished in {:.1}s.",
                elapsed.num_milliseconds() as f64 / 1000.0
            );
        }
    }
}

fn print_reports(prefix: &str, reports: &[ArtifactChain]) {
    for chain in reports {
        println!("{prefix}: {} -> {}", chain.input, chain.html.display());
    }
}
