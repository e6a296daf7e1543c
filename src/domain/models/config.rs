use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for the autopilot engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Lifecycle engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Lifecycle engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineConfig {
    /// Seconds between lifecycle ticks
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// Run a tick as soon as the scheduler starts
    #[serde(default = "default_true")]
    pub run_on_startup: bool,

    /// Processing budget for a single tick, in milliseconds
    #[serde(default = "default_tick_budget_ms")]
    pub tick_budget_ms: u64,

    /// Delay before the first synthesized post goes out, in minutes
    #[serde(default = "default_post_lead_time_mins")]
    pub post_lead_time_mins: u64,

    /// Seed for template selection; random when absent
    #[serde(default)]
    pub content_seed: Option<u64>,
}

const fn default_check_interval_secs() -> u64 {
    60
}

const fn default_true() -> bool {
    true
}

const fn default_tick_budget_ms() -> u64 {
    30_000
}

const fn default_post_lead_time_mins() -> u64 {
    120
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            run_on_startup: true,
            tick_budget_ms: default_tick_budget_ms(),
            post_lead_time_mins: default_post_lead_time_mins(),
            content_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn tick_budget(&self) -> Duration {
        Duration::from_millis(self.tick_budget_ms)
    }

    pub fn post_lead_time(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.post_lead_time_mins as i64)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// Path to `SQLite` database file
    #[serde(default = "default_database_path")]
    pub path: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> String {
    ".autopilot/autopilot.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        if self.path.starts_with("sqlite:") {
            self.path.clone()
        } else {
            format!("sqlite:{}", self.path)
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when absent
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
