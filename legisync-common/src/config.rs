//! Bootstrap configuration loading and database path resolution
//!
//! Two-tier configuration:
//! 1. **TOML Bootstrap**: database path, upstream API settings, logging
//!    (static, read once at startup)
//! 2. **Database Runtime**: per-resource run state in the `sync_state` table
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (--config, --database)
//! 2. Environment variables (LEGISYNC_CONFIG, LEGISYNC_DB, OPENLEG_API_KEY)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Bootstrap configuration loaded from TOML file
///
/// These settings cannot change during runtime. **Minimal by design** —
/// only bootstrap concerns live here; run state lives in the database.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    /// Path to SQLite database file (relative or absolute)
    ///
    /// If not specified, falls back to CLI flag → OS data directory default
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Upstream API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upstream OpenLeg API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Open Legislation API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key, passed as the `key` query parameter
    ///
    /// `OPENLEG_API_KEY` in the environment overrides this value.
    #[serde(default)]
    pub key: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_base_url() -> String {
    "https://legislation.nysenate.gov/api/3".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Load bootstrap configuration
    ///
    /// An explicitly supplied path must exist; the default platform path
    /// (`~/.config/legisync/config.toml`) is optional and falls back to
    /// built-in defaults when absent.
    pub fn load(explicit: Option<&Path>) -> Result<TomlConfig> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::read_file(path)?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Self::read_file(&path)?,
                _ => TomlConfig::default(),
            },
        };

        // Environment override for the API key (never stored in TOML on
        // shared hosts)
        if let Ok(key) = std::env::var("OPENLEG_API_KEY") {
            if !key.is_empty() {
                config.api.key = Some(key);
            }
        }

        Ok(config)
    }

    fn read_file(path: &Path) -> Result<TomlConfig> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Resolve the database file path
    ///
    /// Priority order:
    /// 1. Command-line argument (highest priority; clap also maps LEGISYNC_DB)
    /// 2. TOML config file
    /// 3. OS-dependent compiled default (fallback)
    pub fn resolve_database_path(&self, cli_arg: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_arg {
            return path.to_path_buf();
        }

        if let Some(path) = &self.database_path {
            return path.clone();
        }

        default_data_dir().join("legisync.db")
    }
}

/// Default configuration file path for the platform
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("legisync").join("config.toml"))
}

/// OS-dependent default data folder path
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("legisync"))
        .unwrap_or_else(|| PathBuf::from("./legisync_data"))
}
