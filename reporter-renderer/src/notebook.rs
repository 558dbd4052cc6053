//! Template notebook execution via papermill.

use std::path::Path;

use reporter_core::{ArtifactChain, Invocation, ToolOutput, ToolRunner, ToolsConfig};

use crate::error::RenderError;

/// Notebook parameter that receives the new report's file name.
pub const FILENAME_PARAMETER: &str = "filename";

/// Build `papermill <template> <output> -p filename <input>`.
pub fn papermill_invocation(
    tools: &ToolsConfig,
    template: &Path,
    chain: &ArtifactChain,
) -> Invocation {
    Invocation::new(&tools.papermill)
        .arg(template)
        .arg(&chain.notebook)
        .arg("-p")
        .arg(FILENAME_PARAMETER)
        .arg(chain.input.as_str())
}

/// Execute `template` against the report in `chain`, writing `chain.notebook`.
///
/// Any non-zero exit is [`RenderError::ExecutionFailed`]: a notebook that
/// raised must stop the pipeline before anything is rendered.
pub fn run_report(
    runner: &dyn ToolRunner,
    tools: &ToolsConfig,
    template: &Path,
    chain: &ArtifactChain,
) -> Result<ToolOutput, RenderError> {
    if !template.is_file() {
        return Err(RenderError::TemplateNotFound {
            path: template.to_path_buf(),
        });
    }
    if let Some(dir) = chain.notebook.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let output = runner.run(&papermill_invocation(tools, template, chain))?;
    if !output.success() {
        return Err(RenderError::ExecutionFailed {
            template: template.to_path_buf(),
            output: chain.notebook.clone(),
            status: output.status_label(),
            stderr: output.stderr.trim().to_string(),
        });
    }

    tracing::info!("executed notebook: {}", chain.notebook.display());
    Ok(output)
}
