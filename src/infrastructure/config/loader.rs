use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project directory holding config files and the default database.
pub const PROJECT_DIR: &str = ".autopilot";
/// Prefix for environment overrides, e.g. `AUTOPILOT_ENGINE__CHECK_INTERVAL_SECS`.
pub const ENV_PREFIX: &str = "AUTOPILOT_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["json", "pretty"];
const ROTATIONS: [&str; 3] = ["daily", "hourly", "never"];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid check_interval_secs: {0}. Must be at least 1")]
    InvalidCheckInterval(u64),

    #[error("Invalid tick_budget_ms: {0}. Must be at least 1")]
    InvalidTickBudget(u64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the current project.
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults
    /// 2. .autopilot/config.yaml (created by init)
    /// 3. .autopilot/local.yaml (optional local overrides)
    /// 4. AUTOPILOT_* environment variables, nested keys split on `__`
    pub fn load() -> Result<Config> {
        Self::load_from_dir(Path::new("."))
    }

    /// Load configuration rooted at `root` instead of the working directory.
    pub fn load_from_dir(root: &Path) -> Result<Config> {
        Self::load_with_env_prefix(root, ENV_PREFIX)
    }

    fn load_with_env_prefix(root: &Path, env_prefix: &str) -> Result<Config> {
        let project = root.join(PROJECT_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(project.join("config.yaml")))
            .merge(Yaml::file(project.join("local.yaml")))
            .merge(Env::prefixed(env_prefix).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, ignoring the environment.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.engine.check_interval_secs == 0 {
            return Err(ConfigError::InvalidCheckInterval(
                config.engine.check_interval_secs,
            ));
        }
        if config.engine.tick_budget_ms == 0 {
            return Err(ConfigError::InvalidTickBudget(config.engine.tick_budget_ms));
        }

        if config.database.path.trim().is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }
        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }
        if !LOG_FORMATS.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }
        if !ROTATIONS.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(
                config.logging.rotation.clone(),
            ));
        }

        Ok(())
    }

    /// Default configuration as YAML, written by `init`.
    pub fn default_yaml() -> Result<String> {
        serde_yaml::to_string(&Config::default()).context("Failed to serialize default config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.engine.check_interval_secs, 60);
        assert_eq!(config.engine.tick_budget_ms, 30_000);
        assert_eq!(config.engine.post_lead_time_mins, 120);
        assert_eq!(config.database.path, ".autopilot/autopilot.db");
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
engine:
  check_interval_secs: 15
  content_seed: 42
database:
  path: /custom/path.db
logging:
  level: debug
  format: json
";
        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");
        assert_eq!(config.engine.check_interval_secs, 15);
        assert_eq!(config.engine.content_seed, Some(42));
        assert!(config.engine.run_on_startup);
        assert_eq!(config.database.path, "/custom/path.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.format, "json");
        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.engine.check_interval_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidCheckInterval(0))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_budget() {
        let mut config = Config::default();
        config.engine.tick_budget_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTickBudget(0))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_logging() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(_))
        ));

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogFormat(_))
        ));

        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRotation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_database() {
        let mut config = Config::default();
        config.database.path = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDatabasePath)
        ));

        let mut config = Config::default();
        config.database.max_connections = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxConnections(0))
        ));
    }

    #[test]
    fn test_hierarchical_merging() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join(PROJECT_DIR);
        fs::create_dir_all(&project).unwrap();
        fs::write(
            project.join("config.yaml"),
            "engine:\n  check_interval_secs: 30\n  tick_budget_ms: 5000\nlogging:\n  level: warn\n",
        )
        .unwrap();
        fs::write(project.join("local.yaml"), "engine:\n  check_interval_secs: 10\n").unwrap();

        let config =
            ConfigLoader::load_with_env_prefix(dir.path(), "AUTOPILOT_TEST_MERGE_").unwrap();
        assert_eq!(config.engine.check_interval_secs, 10);
        assert_eq!(config.engine.tick_budget_ms, 5000);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn test_env_override() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("AUTOPILOT_TEST_ENV_ENGINE__CHECK_INTERVAL_SECS", "5");
        std::env::set_var("AUTOPILOT_TEST_ENV_LOGGING__LEVEL", "debug");

        let config = ConfigLoader::load_with_env_prefix(dir.path(), "AUTOPILOT_TEST_ENV_");

        std::env::remove_var("AUTOPILOT_TEST_ENV_ENGINE__CHECK_INTERVAL_SECS");
        std::env::remove_var("AUTOPILOT_TEST_ENV_LOGGING__LEVEL");

        let config = config.unwrap();
        assert_eq!(config.engine.check_interval_secs, 5);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), "logging:\n  format: xml\n").unwrap();
        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_default_yaml_round_trips() {
        let yaml = ConfigLoader::default_yaml().unwrap();
        let config: Config = serde_yaml::from_str(&yaml).unwrap();
        ConfigLoader::validate(&config).unwrap();
    }
}
