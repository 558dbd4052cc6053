//! Error types for reporter-renderer.

use std::path::PathBuf;

use thiserror::Error;

use reporter_core::ProcessError;

/// All errors that can arise from executing or converting a report notebook.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The tool could not be started at all.
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template notebook not found at {path}")]
    TemplateNotFound { path: PathBuf },

    /// papermill exited non-zero; the notebook raised during execution.
    #[error("notebook execution failed for {} ({status}): {stderr}", output.display())]
    ExecutionFailed {
        template: PathBuf,
        output: PathBuf,
        status: String,
        stderr: String,
    },
}
