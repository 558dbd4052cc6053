//! cloud-reporter: turn newly uploaded spreadsheets into published HTML reports.
//!
//! # Usage
//!
//! ```text
//! reporter init --remote-folder <name> --local-folder <path> --template <nb> [--force]
//! reporter run [--dry-run] [--all] [--json]
//! reporter status [--json]
//! ```
//!
//! Every command accepts `--config <path>`; the default is
//! `~/.cloud-reporter/config.yaml`.

mod commands;

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{init::InitArgs, run::RunArgs, status::StatusArgs};
use reporter_core::{ExitCodePolicy, NamingStrategy};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "reporter",
    version,
    about = "Run a notebook against new cloud spreadsheets and publish the HTML report",
    long_about = None,
)]
struct Cli {
    /// Path to the config file (default: ~/.cloud-reporter/config.yaml).
    #[arg(long, short = 'c', global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a config file.
    Init(InitArgs),

    /// Detect new remote reports, execute, render and publish them.
    Run(RunArgs),

    /// Show which remote files are new without changing anything.
    Status(StatusArgs),
}

// ---------------------------------------------------------------------------
// Shared policy arguments, parsed from CLI strings into core types
// ---------------------------------------------------------------------------

/// Thin wrapper so clap can parse `NamingStrategy` from CLI args.
#[derive(Debug, Clone)]
pub struct NamingArg(pub NamingStrategy);

impl FromStr for NamingArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strip-extension" => Ok(Self(NamingStrategy::StripExtension)),
            "first-dot" => Ok(Self(NamingStrategy::FirstDot)),
            other => Err(format!(
                "unknown naming strategy '{other}'; expected: strip-extension, first-dot"
            )),
        }
    }
}

impl From<NamingArg> for NamingStrategy {
    fn from(n: NamingArg) -> Self {
        n.0
    }
}

/// Thin wrapper so clap can parse `ExitCodePolicy` from CLI args.
#[derive(Debug, Clone)]
pub struct ExitCodesArg(pub ExitCodePolicy);

impl FromStr for ExitCodesArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self(ExitCodePolicy::Strict)),
            "lenient" => Ok(Self(ExitCodePolicy::Lenient)),
            other => Err(format!(
                "unknown exit-code policy '{other}'; expected: strict, lenient"
            )),
        }
    }
}

impl From<ExitCodesArg> for ExitCodePolicy {
    fn from(e: ExitCodesArg) -> Self {
        e.0
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Init(args) => args.run(config),
        Commands::Run(args) => args.run(config),
        Commands::Status(args) => args.run(config),
    }
}

/// Progress goes to stderr so `--json` output on stdout stays clean.
/// `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
