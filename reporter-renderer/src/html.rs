//! HTML conversion via `jupyter nbconvert`.

use std::path::Path;

use reporter_core::{ArtifactChain, Invocation, ToolOutput, ToolRunner, ToolsConfig};

use crate::error::RenderError;

/// Build `jupyter nbconvert <notebook> --to=html`.
pub fn nbconvert_invocation(tools: &ToolsConfig, notebook: &Path) -> Invocation {
    Invocation::new(&tools.jupyter)
        .arg("nbconvert")
        .arg(notebook)
        .arg("--to=html")
}

/// Convert `chain.notebook` to HTML. nbconvert writes it next to the
/// notebook, which is where `chain.html` points.
///
/// The exit status is returned, not judged; callers apply their own policy.
pub fn render_html(
    runner: &dyn ToolRunner,
    tools: &ToolsConfig,
    chain: &ArtifactChain,
) -> Result<ToolOutput, RenderError> {
    let output = runner.run(&nbconvert_invocation(tools, &chain.notebook))?;
    if output.success() {
        tracing::info!("HTML report generated: {}", chain.html.display());
    }
    Ok(output)
}
