use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::trace;

use crate::models::NewMonitor;
use crate::storage::backend::DEFAULT_MAX_RESULTS_PER_MONITOR;

/// Default trailing window for uptime and latency aggregates
pub const DEFAULT_UPTIME_WINDOW_HOURS: u32 = 24;

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// In-memory storage (no persistence)
    #[serde(rename = "none")]
    None,

    /// SQLite database (default)
    Sqlite {
        /// Path to the SQLite database file
        #[serde(default = "default_sqlite_path")]
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::Sqlite {
            path: default_sqlite_path(),
        }
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("./uptime.db")
}

/// Check history retention
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct RetentionConfig {
    /// Most recent results kept per monitor
    #[serde(default = "default_max_results")]
    pub max_results_per_monitor: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_results_per_monitor: default_max_results(),
        }
    }
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS_PER_MONITOR
}

/// HTTP API settings
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Optional bearer token required on every request
    pub token: Option<String>,

    #[serde(default = "default_cors")]
    pub cors: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            token: None,
            cors: default_cors(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], crate::util::get_default_port()))
}

fn default_cors() -> bool {
    true
}

fn default_window_hours() -> u32 {
    DEFAULT_UPTIME_WINDOW_HOURS
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub retention: RetentionConfig,

    /// Trailing window (hours) for uptime percentage and average latency
    #[serde(default = "default_window_hours")]
    pub uptime_window_hours: u32,

    #[serde(default)]
    pub api: ApiSettings,

    /// Monitors registered on first start (only when the registry is empty)
    pub monitors: Option<Vec<NewMonitor>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            retention: RetentionConfig::default(),
            uptime_window_hours: DEFAULT_UPTIME_WINDOW_HOURS,
            api: ApiSettings::default(),
            monitors: None,
        }
    }
}

impl Config {
    /// Reject values that would make every status meaningless
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.retention.max_results_per_monitor == 0 {
            anyhow::bail!("retention.max_results_per_monitor must be at least 1");
        }
        if self.uptime_window_hours == 0 {
            anyhow::bail!("uptime_window_hours must be at least 1");
        }
        Ok(())
    }

    /// Apply environment overrides (`UPTIME_BIND_ADDR`, `UPTIME_API_TOKEN`)
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(bind) = crate::util::get_bind_addr() {
            self.api.bind = bind;
        }
        if let Some(token) = crate::util::get_api_token() {
            self.api.token = Some(token);
        }
        self
    }
}

pub fn read_config_file(path: &str) -> anyhow::Result<Config> {
    let file_content = std::fs::read_to_string(path)?;
    parse_config(&file_content)
}

pub fn parse_config(content: &str) -> anyhow::Result<Config> {
    let config: Config = serde_json::from_str(content)
        .map_err(|e| anyhow::anyhow!("Invalid configuration file provided: {e}"))?;
    config.validate()?;

    trace!("loaded config: {config:?}");
    Ok(config)
}
