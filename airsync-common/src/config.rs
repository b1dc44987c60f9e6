//! Configuration loading
//!
//! Config file resolution follows the usual priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `AIRSYNC_CONFIG`
//! 3. Platform config directory (`~/.config/airsync/config.toml` on Linux)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file never stops startup: it is logged and the compiled
//! defaults are used. A file that exists but does not parse is an error.

use crate::civil_time::{TzdbCivilTime, DEFAULT_TIMEZONE};
use crate::snapshot::SNAPSHOT_TTL_MS;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "AIRSYNC_CONFIG";

/// Sync core configuration
///
/// Every default reproduces the fixed constants of the sync core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// IANA name of the civil timezone used for week boundaries
    pub timezone: String,
    /// Snapshot time-to-live in seconds
    pub snapshot_ttl_secs: u64,
    /// Default tracing level (overridden by RUST_LOG)
    pub log_level: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.to_string(),
            snapshot_ttl_secs: (SNAPSHOT_TTL_MS / 1000) as u64,
            log_level: "info".to_string(),
        }
    }
}

impl SyncConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SyncConfig =
            toml::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {} not found, using compiled defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the config file path by priority and load it
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No config file location available, using compiled defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check values that would otherwise fail later at an awkward point
    pub fn validate(&self) -> Result<()> {
        if self.timezone.trim().is_empty() {
            return Err(Error::Config("timezone must not be empty".to_string()));
        }
        if self.snapshot_ttl_secs == 0 {
            return Err(Error::Config("snapshot_ttl_secs must be greater than zero".to_string()));
        }
        if self.snapshot_ttl_secs > i64::MAX as u64 / 1000 {
            return Err(Error::Config(format!(
                "snapshot_ttl_secs {} is too large",
                self.snapshot_ttl_secs
            )));
        }
        Ok(())
    }

    /// Civil timezone named by this config
    pub fn civil_time(&self) -> Result<TzdbCivilTime> {
        TzdbCivilTime::from_name(&self.timezone)
    }

    /// Snapshot TTL as a chrono duration
    pub fn snapshot_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.snapshot_ttl_secs as i64)
    }
}

/// Config file path by priority, `None` when no location can be determined
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path()
}

/// `<config_dir>/airsync/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("airsync").join("config.toml"))
}
