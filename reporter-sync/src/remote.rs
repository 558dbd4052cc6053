//! rclone mutations: mirror the remote folder locally, upload a file.

use std::path::Path;

use reporter_core::{Invocation, ReporterConfig, ToolOutput, ToolRunner};

use crate::error::SyncError;

/// Build `rclone sync <remote>:<folder> <local_folder>`.
pub fn sync_invocation(config: &ReporterConfig) -> Invocation {
    Invocation::new(&config.tools.rclone)
        .arg("sync")
        .arg(config.remote_spec())
        .arg(&config.local_folder)
}

/// Build `rclone copy <file> <remote>:<folder>`.
pub fn copy_invocation(config: &ReporterConfig, file: &Path) -> Invocation {
    Invocation::new(&config.tools.rclone)
        .arg("copy")
        .arg(file)
        .arg(config.remote_spec())
}

/// Make the local folder mirror the remote one. Blocks until rclone exits.
pub fn sync_mirror(
    runner: &dyn ToolRunner,
    config: &ReporterConfig,
) -> Result<ToolOutput, SyncError> {
    tracing::info!(
        "Syncing local directory {} from {}",
        config.local_folder.display(),
        config.remote_spec()
    );
    Ok(runner.run(&sync_invocation(config))?)
}

/// Upload a single local file into the remote folder.
pub fn publish(
    runner: &dyn ToolRunner,
    config: &ReporterConfig,
    file: &Path,
) -> Result<ToolOutput, SyncError> {
    tracing::info!("publishing {} -> {}", file.display(), config.remote_spec());
    Ok(runner.run(&copy_invocation(config, file))?)
}
