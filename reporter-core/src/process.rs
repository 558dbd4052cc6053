//! External process invocation.
//!
//! Every external tool call goes through [`ToolRunner`] so the pipeline can
//! be driven by a recording fake in tests. [`SystemRunner`] is the real
//! implementation: it blocks until the child exits and never applies a
//! timeout.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::ProcessError;

/// A single command line to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Program file name without directories, e.g. `rclone`.
    pub fn program_name(&self) -> String {
        program_name(&self.program)
    }

    /// Lossy argument strings, mostly for assertions and logs.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// File name of `program` without directories, falling back to the full path.
pub fn program_name(program: &Path) -> String {
    program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string())
}

/// Captured result of a finished external process.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToolOutput {
    /// Exit code; `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable exit status, e.g. `exit code 3` or `terminated by signal`.
    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Seam for running external tools.
pub trait ToolRunner {
    /// Run `invocation` to completion and capture its output.
    ///
    /// A non-zero exit status is *not* an error here; callers decide.
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ProcessError>;
}

/// Runs tools as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ProcessError> {
        tracing::debug!("exec: {invocation}");
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .output()
            .map_err(|source| ProcessError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(ToolOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
