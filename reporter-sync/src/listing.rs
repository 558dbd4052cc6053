//! Remote and local folder listings.

use std::io::ErrorKind;
use std::path::Path;

use reporter_core::{Filename, Invocation, ReporterConfig, Stage, ToolRunner};

use crate::error::{check_status, io_err, SyncError};

/// Split newline-delimited tool output into names.
///
/// Only the empty element left by a trailing newline is dropped; names are
/// otherwise kept byte-for-byte.
pub fn parse_listing(stdout: &str) -> Vec<Filename> {
    let mut names: Vec<Filename> = stdout.split('\n').map(Filename::from).collect();
    if names.last().is_some_and(|n| n.0.is_empty()) {
        names.pop();
    }
    names
}

/// Build `rclone lsf <remote>:<folder>`.
pub fn lsf_invocation(config: &ReporterConfig) -> Invocation {
    Invocation::new(&config.tools.rclone)
        .arg("lsf")
        .arg(config.remote_spec())
}

/// List the names in the remote folder, in the order rclone prints them.
///
/// Under the lenient policy a failed listing still yields whatever stdout
/// contained, which is usually nothing.
pub fn list_remote(
    runner: &dyn ToolRunner,
    config: &ReporterConfig,
) -> Result<Vec<Filename>, SyncError> {
    let invocation = lsf_invocation(config);
    let output = runner.run(&invocation)?;
    check_status(
        Stage::Detecting,
        invocation.program_name(),
        &output,
        config.exit_codes,
    )?;
    let names = parse_listing(&output.stdout);
    tracing::debug!("remote {} has {} entries", config.remote_spec(), names.len());
    Ok(names)
}

/// List the names in the local mirror, sorted. Dot-files are skipped.
///
/// A mirror directory that does not exist yet lists as empty.
pub fn list_local(dir: &Path) -> Result<Vec<Filename>, SyncError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::debug!("local mirror {} does not exist yet", dir.display());
            return Ok(vec![]);
        }
        Err(err) => return Err(io_err(dir, err)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        names.push(Filename::from(name));
    }
    names.sort();
    Ok(names)
}
