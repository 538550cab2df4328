//! Configuration loading and management
//!
//! Handles parsing of `.taskman.toml` configuration files found in the
//! data directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the configuration file inside the data directory
pub const CONFIG_FILE: &str = ".taskman.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backing storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Report output configuration
    #[serde(default)]
    pub reports: ReportsConfig,
}

/// Backing storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Task records file, one task per line
    #[serde(default = "default_tasks_file")]
    pub tasks_file: String,

    /// User records file, one user per line
    #[serde(default = "default_users_file")]
    pub users_file: String,

    /// Rewrite stores through a temp file + rename
    #[serde(default = "default_true")]
    pub atomic_writes: bool,
}

fn default_tasks_file() -> String {
    "tasks.txt".to_string()
}

fn default_users_file() -> String {
    "user.txt".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tasks_file: default_tasks_file(),
            users_file: default_users_file(),
            atomic_writes: default_true(),
        }
    }
}

/// Generated report configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    /// Directory for generated reports, relative to the data directory
    #[serde(default = "default_reports_dir")]
    pub dir: String,

    /// Task overview report file name
    #[serde(default = "default_task_overview")]
    pub task_overview: String,

    /// User overview report file name
    #[serde(default = "default_user_overview")]
    pub user_overview: String,
}

fn default_reports_dir() -> String {
    ".".to_string()
}

fn default_task_overview() -> String {
    "task_overview.txt".to_string()
}

fn default_user_overview() -> String {
    "user_overview.txt".to_string()
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            dir: default_reports_dir(),
            task_overview: default_task_overview(),
            user_overview: default_user_overview(),
        }
    }
}

impl ReportsConfig {
    /// Resolve the report directory against the data directory
    pub fn resolve_dir(&self, data_dir: &Path) -> PathBuf {
        let dir = Path::new(self.dir.trim());
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            data_dir.join(dir)
        }
    }
}

fn validate_file_name(value: &str, field: &str) -> crate::error::Result<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::error::Error::InvalidConfig(format!(
            "{field} cannot be empty"
        )));
    }
    if trimmed.contains('/') || trimmed.contains('\\') || trimmed == "." || trimmed == ".." {
        return Err(crate::error::Error::InvalidConfig(format!(
            "{field}: '{trimmed}' must be a plain file name"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from a `.taskman.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the data directory, or return defaults
    pub fn load_from_dir(data_dir: &Path) -> Self {
        let config_path = data_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %err,
                    "ignoring invalid config, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        validate_file_name(&self.storage.tasks_file, "storage.tasks_file")?;
        validate_file_name(&self.storage.users_file, "storage.users_file")?;
        if self.storage.tasks_file.trim() == self.storage.users_file.trim() {
            return Err(crate::error::Error::InvalidConfig(
                "storage.tasks_file and storage.users_file must differ".to_string(),
            ));
        }
        if self.reports.dir.trim().is_empty() {
            return Err(crate::error::Error::InvalidConfig(
                "reports.dir cannot be empty".to_string(),
            ));
        }
        validate_file_name(&self.reports.task_overview, "reports.task_overview")?;
        validate_file_name(&self.reports.user_overview, "reports.user_overview")?;
        if self.reports.task_overview.trim() == self.reports.user_overview.trim() {
            return Err(crate::error::Error::InvalidConfig(
                "reports.task_overview and reports.user_overview must differ".to_string(),
            ));
        }
        Ok(())
    }
}
