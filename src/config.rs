use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub contacts: ContactsConfig,

    #[serde(default)]
    pub blocking: BlockingConfig,

    #[serde(default)]
    pub retention: RetentionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StorageConfig {
    /// "sqlite" or "memory"
    #[serde(default = "default_storage_backend")]
    pub backend: String,
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ContactsConfig {
    /// Address-book export to import from (JSON array or `name;phone` lines).
    #[serde(default)]
    pub import_path: Option<String>,
    /// 0 disables the periodic re-import.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_minutes: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BlockingConfig {
    #[serde(default = "default_blocking_enabled")]
    pub default_enabled: bool,
}

/// Blocked-call log retention. `None` (or `0`, since TOML has no null) disables that limit.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RetentionConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: Option<usize>,
    #[serde(default)]
    pub max_age_hours: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_enable")]
    pub enable: bool,
    #[serde(default = "default_log_blocked")]
    pub log_blocked: bool,
    #[serde(default = "default_log_allowed")]
    pub log_allowed: bool,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_sinks")]
    pub sinks: Vec<String>,
    #[serde(default = "default_recent_capacity")]
    pub recent_capacity: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotificationConfig {
    #[serde(default = "default_notifications_enable")]
    pub enable: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StatsConfig {
    #[serde(default = "default_stats_enable")]
    pub enable: bool,
    #[serde(default = "default_log_interval")]
    pub log_interval_seconds: u64,
}

// Defaults
fn default_storage_backend() -> String {
    "sqlite".to_string()
}
fn default_sqlite_path() -> String {
    "call-blocker.db".to_string()
}
fn default_refresh_interval() -> u64 {
    0
}
fn default_blocking_enabled() -> bool {
    true
}
fn default_max_entries() -> Option<usize> {
    Some(1000)
}
fn default_log_enable() -> bool {
    true
}
fn default_log_blocked() -> bool {
    true
}
fn default_log_allowed() -> bool {
    true
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_sinks() -> Vec<String> {
    vec!["console".to_string()]
}
fn default_recent_capacity() -> usize {
    100
}
fn default_notifications_enable() -> bool {
    true
}
fn default_stats_enable() -> bool {
    true
}
fn default_log_interval() -> u64 {
    300
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            sqlite_path: default_sqlite_path(),
        }
    }
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            import_path: None,
            refresh_interval_minutes: default_refresh_interval(),
        }
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            default_enabled: default_blocking_enabled(),
        }
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            max_age_hours: None,
        }
    }
}

impl RetentionConfig {
    /// No cap at all, matching a log that only ever grows.
    pub fn unbounded() -> Self {
        Self {
            max_entries: None,
            max_age_hours: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable: default_log_enable(),
            log_blocked: default_log_blocked(),
            log_allowed: default_log_allowed(),
            format: default_log_format(),
            level: default_log_level(),
            sinks: default_log_sinks(),
            recent_capacity: default_recent_capacity(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enable: default_notifications_enable(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enable: default_stats_enable(),
            log_interval_seconds: default_log_interval(),
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("Failed to parse config TOML")?;
        Ok(config)
    }
}
