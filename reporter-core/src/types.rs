//! Domain types for cloud-reporter.
//!
//! Filenames are compared as exact strings; nothing here normalizes case,
//! trailing slashes, or encoding. All path fields use `PathBuf`.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A file name as reported by a remote or local listing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filename(pub String);

impl Filename {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Filename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Filename {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Filename {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Policies
// ---------------------------------------------------------------------------

/// How a report's base name is derived from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NamingStrategy {
    /// Keep everything before the first dot: `Q1.2024.xlsx` -> `Q1`.
    #[default]
    FirstDot,
    /// Strip exactly one trailing extension: `Q1.2024.xlsx` -> `Q1.2024`.
    StripExtension,
}

impl NamingStrategy {
    /// Derive the base name shared by every artifact of a report.
    pub fn base_name(self, name: &str) -> String {
        match self {
            NamingStrategy::FirstDot => name.split('.').next().unwrap_or_default().to_owned(),
            NamingStrategy::StripExtension => match name.rsplit_once('.') {
                // A leading dot marks a hidden file, not an extension.
                Some((stem, _)) if !stem.is_empty() => stem.to_owned(),
                _ => name.to_owned(),
            },
        }
    }
}

impl fmt::Display for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingStrategy::StripExtension => write!(f, "strip-extension"),
            NamingStrategy::FirstDot => write!(f, "first-dot"),
        }
    }
}

/// Which of the detected new files a run processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Only the lexicographically first new file.
    #[default]
    First,
    /// Every new file, in lexicographic order.
    All,
}

impl SelectionPolicy {
    /// Apply the policy to an already sorted list of new files.
    pub fn select(self, new_files: &[Filename]) -> &[Filename] {
        match self {
            SelectionPolicy::First => &new_files[..new_files.len().min(1)],
            SelectionPolicy::All => new_files,
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::First => write!(f, "first"),
            SelectionPolicy::All => write!(f, "all"),
        }
    }
}

/// What the pipeline does with a non-zero exit status from an external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExitCodePolicy {
    /// Log a warning and carry on. Notebook execution failures stay fatal.
    #[default]
    Lenient,
    /// Abort the run with an error naming the failed stage.
    Strict,
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Stages of a single pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Detecting,
    Syncing,
    Running,
    Rendering,
    Publishing,
    Resyncing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Detecting => "detecting",
            Stage::Syncing => "syncing",
            Stage::Running => "running",
            Stage::Rendering => "rendering",
            Stage::Publishing => "publishing",
            Stage::Resyncing => "resyncing",
            Stage::Done => "done",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Artifact chain
// ---------------------------------------------------------------------------

/// Files derived from one input report: spreadsheet, executed notebook, HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactChain {
    pub input: Filename,
    pub base: String,
    pub notebook: PathBuf,
    pub html: PathBuf,
}

impl ArtifactChain {
    /// Derive the chain for `input`, placing artifacts under `work_dir`.
    pub fn derive(input: &Filename, naming: NamingStrategy, work_dir: &Path) -> Self {
        let base = naming.base_name(input.as_str());
        Self {
            input: input.clone(),
            notebook: work_dir.join(format!("{base}.ipynb")),
            html: work_dir.join(format!("{base}.html")),
            base,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
