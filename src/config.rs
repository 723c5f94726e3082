//! Configuration loading and management
//!
//! Handles parsing of `config.toml`. Every section is optional; missing
//! values fall back to defaults.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the configuration file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Storage location and locking
    #[serde(default)]
    pub storage: StorageConfig,

    /// Quota advisory
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Startup maintenance
    #[serde(default)]
    pub cleanup: CleanupConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `storage.json`; empty means the platform data dir
    #[serde(default)]
    pub data_dir: String,

    /// How long a writer waits for the storage lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    crate::lock::DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Advisory storage quota in bytes
    #[serde(default = "default_quota_max_bytes")]
    pub max_bytes: u64,

    /// Fraction of `max_bytes` above which a warning is emitted
    #[serde(default = "default_quota_warn_ratio")]
    pub warn_ratio: f64,
}

fn default_quota_max_bytes() -> u64 {
    5 * 1024 * 1024
}

fn default_quota_warn_ratio() -> f64 {
    0.9
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_bytes: default_quota_max_bytes(),
            warn_ratio: default_quota_warn_ratio(),
        }
    }
}

impl QuotaConfig {
    /// Byte count above which usage is reported as high
    pub fn warn_threshold(&self) -> u64 {
        (self.max_bytes as f64 * self.warn_ratio) as u64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupConfig {
    /// Remove aged done tasks when the store is opened
    #[serde(default)]
    pub auto: bool,

    /// Age threshold used by startup maintenance
    #[serde(default = "default_cleanup_older_than_days")]
    pub older_than_days: u32,
}

fn default_cleanup_older_than_days() -> u32 {
    30
}

/// Upper bound for `cleanup.older_than_days` (about a century)
pub const MAX_CLEANUP_DAYS: u32 = 36_500;

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            auto: false,
            older_than_days: default_cleanup_older_than_days(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "todomaster", "todomaster")
}

/// Default location of `config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or return defaults when it is missing
    /// or invalid
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolve the directory holding persisted state
    ///
    /// An explicit override wins over `storage.data_dir`, which wins over the
    /// platform data directory.
    pub fn data_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        let configured = self.storage.data_dir.trim();
        if !configured.is_empty() {
            return Ok(PathBuf::from(configured));
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "storage.data_dir is empty and no platform data directory is available"
                        .to_string(),
                )
            })
    }

    fn validate(&self) -> Result<()> {
        if self.storage.lock_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        if self.quota.max_bytes == 0 {
            return Err(Error::InvalidConfig(
                "quota.max_bytes must be > 0".to_string(),
            ));
        }
        if !(self.quota.warn_ratio > 0.0 && self.quota.warn_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "quota.warn_ratio must be in (0, 1], got {}",
                self.quota.warn_ratio
            )));
        }
        if self.cleanup.older_than_days > MAX_CLEANUP_DAYS {
            return Err(Error::InvalidConfig(format!(
                "cleanup.older_than_days must be <= {MAX_CLEANUP_DAYS}, got {}",
                self.cleanup.older_than_days
            )));
        }
        Ok(())
    }
}
