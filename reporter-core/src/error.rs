//! Error types for reporter-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, validating, or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("config not found at {path}; run `reporter init` first")]
    ConfigNotFound { path: PathBuf },

    #[error("config already exists at {path}; pass --force to overwrite")]
    AlreadyExists { path: PathBuf },

    /// A field failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Errors from starting an external process.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to start '{}': {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
