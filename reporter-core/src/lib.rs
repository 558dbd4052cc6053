//! cloud-reporter core library: domain types, configuration, process seam.
//!
//! - [`types`]: filenames, artifact naming, run policies
//! - [`config`]: load / save / init of the YAML config
//! - [`process`]: [`ToolRunner`] and the real [`SystemRunner`]
//! - [`error`]: [`ConfigError`], [`ProcessError`]

pub mod config;
pub mod error;
pub mod process;
pub mod types;

pub use config::{ReporterConfig, ToolsConfig};
pub use error::{ConfigError, ProcessError};
pub use process::{Invocation, SystemRunner, ToolOutput, ToolRunner};
pub use types::{ArtifactChain, ExitCodePolicy, Filename, NamingStrategy, SelectionPolicy, Stage};
