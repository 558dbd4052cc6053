//! Reporter configuration file.
//!
//! # Storage layout
//!
//! ```text
//! ~/.cloud-reporter/
//!   config.yaml   (mode 0600)
//! ```
//!
//! # API pattern
//!
//! Functions that need the home directory come in two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{ExitCodePolicy, NamingStrategy, SelectionPolicy};

// ---------------------------------------------------------------------------
// 1. Types
// ---------------------------------------------------------------------------

/// Everything a pipeline run needs to know, passed in explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReporterConfig {
    /// rclone remote name; the folder is addressed as `<remote_name>:<remote_folder>`.
    #[serde(default = "default_remote_name")]
    pub remote_name: String,
    pub remote_folder: String,
    /// Local mirror of the remote folder.
    pub local_folder: PathBuf,
    /// Parameterized notebook executed once per new report.
    pub template_path: PathBuf,
    /// Directory receiving the executed notebook and HTML artifacts.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    #[serde(default)]
    pub naming: NamingStrategy,
    #[serde(default)]
    pub selection: SelectionPolicy,
    #[serde(default)]
    pub exit_codes: ExitCodePolicy,
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Program paths of the external tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub rclone: PathBuf,
    pub papermill: PathBuf,
    pub jupyter: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            rclone: PathBuf::from("rclone"),
            papermill: PathBuf::from("papermill"),
            jupyter: PathBuf::from("jupyter"),
        }
    }
}

fn default_remote_name() -> String {
    "remote".to_string()
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

impl ReporterConfig {
    /// Config with the three required fields set and defaults elsewhere.
    pub fn new(
        remote_folder: impl Into<String>,
        local_folder: impl Into<PathBuf>,
        template_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            remote_name: default_remote_name(),
            remote_folder: remote_folder.into(),
            local_folder: local_folder.into(),
            template_path: template_path.into(),
            work_dir: default_work_dir(),
            naming: NamingStrategy::default(),
            selection: SelectionPolicy::default(),
            exit_codes: ExitCodePolicy::default(),
            tools: ToolsConfig::default(),
        }
    }

    /// `<remote_name>:<remote_folder>`, the rclone address of the remote folder.
    pub fn remote_spec(&self) -> String {
        format!("{}:{}", self.remote_name, self.remote_folder)
    }

    /// Reject configs the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote_name.trim().is_empty() {
            return Err(ConfigError::Invalid("remote_name must not be empty".into()));
        }
        if self.remote_name.contains(':') {
            return Err(ConfigError::Invalid(format!(
                "remote_name '{}' must not contain ':'",
                self.remote_name
            )));
        }
        if self.remote_folder.trim().is_empty() {
            return Err(ConfigError::Invalid("remote_folder must not be empty".into()));
        }
        if self.local_folder.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("local_folder must not be empty".into()));
        }
        if self.template_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("template_path must not be empty".into()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// 2. Paths
// ---------------------------------------------------------------------------

/// `<home>/.cloud-reporter/config.yaml`: pure, no I/O.
pub fn default_path_at(home: &Path) -> PathBuf {
    home.join(".cloud-reporter").join("config.yaml")
}

/// `default_path_at` convenience wrapper.
pub fn default_path() -> Result<PathBuf, ConfigError> {
    Ok(default_path_at(&home()?))
}

/// Use `explicit` when given, otherwise the default location.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_path(),
    }
}

// ---------------------------------------------------------------------------
// 3. Load / save
// ---------------------------------------------------------------------------

/// Load and validate the config at `path`.
///
/// Returns `ConfigError::ConfigNotFound` if absent,
/// `ConfigError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(path: &Path) -> Result<ReporterConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path)?;
    let config: ReporterConfig = serde_yaml::from_str(&contents).map_err(|e| {
        ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    config.validate()?;
    Ok(config)
}

/// Atomically save `config` to `path`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
pub fn save_at(path: &Path, config: &ReporterConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 4. Init
// ---------------------------------------------------------------------------

/// Validate and write a fresh config to `path`.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn init_at(path: &Path, config: &ReporterConfig, force: bool) -> Result<(), ConfigError> {
    config.validate()?;
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    save_at(path, config)?;
    tracing::info!("wrote config: {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}
