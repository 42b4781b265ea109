//! Configuration management for vpndir.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::ProviderId;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main updater configuration.
///
/// This is loaded from `~/.config/vpndir/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// HTTP client settings
    pub http: HttpConfig,
    /// Parallel DNS resolution settings
    pub resolver: ResolverConfig,
    /// Update run settings
    pub updates: UpdatesConfig,
}

impl UpdaterConfig {
    /// Load configuration from the default location, falling back to defaults
    /// if not found.
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, falling back to defaults if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            tracing::debug!("Loading config from {}", path.display());
            let contents = fs::read_to_string(path)?;
            let config: Self = toml::from_str(&contents)?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Apply environment variable overrides on top of loaded values.
    ///
    /// Supports the following environment variables:
    /// - `VPNDIR_HTTP_TIMEOUT_SECS`: Override the HTTP request timeout
    /// - `VPNDIR_CONCURRENT_UPDATES`: Override how many providers update at once
    /// - `VPNDIR_SNAPSHOT_PATH`: Override where the directory JSON is written
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("VPNDIR_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.http.timeout_secs = secs;
                tracing::debug!("Override http.timeout_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("VPNDIR_CONCURRENT_UPDATES") {
            if let Ok(count) = val.parse() {
                self.updates.concurrent_updates = count;
                tracing::debug!("Override updates.concurrent_updates from env: {}", count);
            }
        }

        if let Ok(val) = std::env::var("VPNDIR_SNAPSHOT_PATH") {
            if !val.is_empty() {
                tracing::debug!("Override updates.snapshot_path from env: {}", val);
                self.updates.snapshot_path = Some(PathBuf::from(val));
            }
        }

        self
    }

    /// Save configuration to the given path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        tracing::debug!("Saving config to {}", path.display());
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.resolver.max_fail_ratio) {
            return Err(invalid(
                "resolver.max_fail_ratio",
                "must be between 0 and 1",
            ));
        }
        if self.resolver.max_fails == 0 {
            return Err(invalid("resolver.max_fails", "must be at least 1"));
        }
        if self.resolver.max_no_new == 0 {
            return Err(invalid("resolver.max_no_new", "must be at least 1"));
        }
        if self.resolver.max_duration_secs == 0 {
            return Err(invalid("resolver.max_duration_secs", "must be at least 1"));
        }
        if self.updates.concurrent_updates == 0 {
            return Err(invalid("updates.concurrent_updates", "must be at least 1"));
        }
        if self.http.timeout_secs == 0 {
            return Err(invalid("http.timeout_secs", "must be at least 1"));
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/vpndir/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Get the default directory snapshot path.
    ///
    /// Uses XDG base directories: `~/.local/share/vpndir/servers.json`
    pub fn default_snapshot_path() -> ConfigResult<PathBuf> {
        Ok(project_dirs()?.data_dir().join("servers.json"))
    }

    /// Snapshot path from the config, or the XDG default.
    pub fn snapshot_path(&self) -> ConfigResult<PathBuf> {
        match &self.updates.snapshot_path {
            Some(path) => Ok(path.clone()),
            None => Self::default_snapshot_path(),
        }
    }
}

fn project_dirs() -> ConfigResult<ProjectDirs> {
    ProjectDirs::from("net", "vpndir", "vpndir").ok_or(ConfigError::NoConfigDir)
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("vpndir/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Parallel DNS resolution settings shared by every provider run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Highest tolerated fraction of hosts that never resolve
    pub max_fail_ratio: f64,
    /// Wall-clock budget for one resolution call, in seconds
    pub max_duration_secs: u64,
    /// Pause between resolution rounds, in milliseconds
    pub between_ms: u64,
    /// Consecutive rounds without a newly resolved host before giving up
    pub max_no_new: u32,
    /// Consecutive failures after which a host is abandoned
    pub max_fails: u32,
    /// Sort each host's addresses for reproducible snapshots
    pub sort_ips: bool,
}

impl ResolverConfig {
    /// Resolution budget as a `Duration`.
    #[must_use]
    pub fn max_duration(&self) -> Duration {
        Duration::from_secs(self.max_duration_secs)
    }

    /// Pause between rounds as a `Duration`.
    #[must_use]
    pub fn between_duration(&self) -> Duration {
        Duration::from_millis(self.between_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_fail_ratio: 0.1,
            max_duration_secs: 20,
            between_ms: 1000,
            max_no_new: 2,
            max_fails: 3,
            sort_ips: true,
        }
    }
}

/// Update run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatesConfig {
    /// Number of providers updated concurrently
    pub concurrent_updates: usize,
    /// Per-provider minimum server counts overriding the built-in floors
    pub min_servers: BTreeMap<ProviderId, usize>,
    /// Where the directory JSON is read from and written to
    pub snapshot_path: Option<PathBuf>,
}

impl Default for UpdatesConfig {
    fn default() -> Self {
        Self {
            concurrent_updates: 3,
            min_servers: BTreeMap::new(),
            snapshot_path: None,
        }
    }
}
