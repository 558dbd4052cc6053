//! `reporter status`: compare remote and local listings without side effects.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use reporter_core::{Filename, ReporterConfig, SystemRunner};
use reporter_sync::{Detection, Pipeline};

use super::load_config;

/// Arguments for `reporter status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let detection = Pipeline::new(&config, &SystemRunner)
            .detect()
            .with_context(|| format!("failed to list '{}'", config.remote_spec()))?;

        if self.json {
            print_json(&config, &detection)?;
            return Ok(());
        }

        print_table(&config, &detection);
        Ok(())
    }
}

#[derive(Serialize)]
struct StatusJson<'a> {
    remote: String,
    local_folder: String,
    synced: bool,
    #[serde(flatten)]
    detection: &'a Detection,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "state")]
    state: String,
}

fn print_json(config: &ReporterConfig, detection: &Detection) -> Result<()> {
    let payload = StatusJson {
        remote: config.remote_spec(),
        local_folder: config.local_folder.display().to_string(),
        synced: detection.is_synced(),
        detection,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(config: &ReporterConfig, detection: &Detection) {
    println!(
        "cloud-reporter v{} | {} | {} remote | {} new",
        env!("CARGO_PKG_VERSION"),
        config.remote_spec(),
        detection.remote.len(),
        detection.new_files.len(),
    );

    if detection.remote.is_empty() {
        println!("Remote folder is empty.");
        return;
    }

    let new: BTreeSet<&Filename> = detection.new_files.iter().collect();
    let rows: Vec<StatusTableRow> = detection
        .remote
        .iter()
        .map(|name| StatusTableRow {
            file: name.to_string(),
            state: state_label(new.contains(name)),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if detection.is_synced() {
        println!("Everything is synced. No new files.");
    } else {
        println!("Run 'reporter run' to process new reports.");
    }
}

fn state_label(is_new: bool) -> String {
    if is_new {
        "new".yellow().bold().to_string()
    } else {
        "mirrored".green().to_string()
    }
}
