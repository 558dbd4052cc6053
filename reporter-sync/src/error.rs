//! Error types for reporter-sync.

use std::path::PathBuf;

use thiserror::Error;

use reporter_core::{ExitCodePolicy, ProcessError, Stage, ToolOutput};
use reporter_renderer::RenderError;

/// All errors that can arise from listing, syncing, publishing, or running
/// the pipeline.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An external tool could not be started.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// Notebook execution or conversion failed.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external tool exited non-zero under the strict exit-code policy.
    #[error("{stage} failed: {program} exited with {status}{}", stderr_suffix(.stderr))]
    ToolFailed {
        stage: Stage,
        program: String,
        status: String,
        stderr: String,
    },
}

impl SyncError {
    /// Pipeline stage the error is attributed to, when known.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            SyncError::ToolFailed { stage, .. } => Some(*stage),
            SyncError::Render(RenderError::ExecutionFailed { .. }) => Some(Stage::Running),
            _ => None,
        }
    }
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Apply `policy` to a finished tool run.
///
/// Strict turns a non-zero exit into [`SyncError::ToolFailed`]; lenient logs
/// it and lets the caller continue.
pub(crate) fn check_status(
    stage: Stage,
    program: String,
    output: &ToolOutput,
    policy: ExitCodePolicy,
) -> Result<(), SyncError> {
    if output.success() {
        return Ok(());
    }
    match policy {
        ExitCodePolicy::Strict => Err(SyncError::ToolFailed {
            stage,
            program,
            status: output.status_label(),
            stderr: output.stderr.trim().to_string(),
        }),
        ExitCodePolicy::Lenient => {
            tracing::warn!(
                "{stage} failed: {program} exited with {}{}; continuing",
                output.status_label(),
                stderr_suffix(output.stderr.trim())
            );
            Ok(())
        }
    }
}
