//! SQLite adapters for the autopilot ports.

pub mod ab_test_repository;
pub mod activity_log_repository;
pub mod campaign_repository;
pub mod connection;
pub mod migrations;
pub mod trigger_config_repository;

pub use ab_test_repository::SqliteAbTestRepository;
pub use activity_log_repository::SqliteActivityLog;
pub use campaign_repository::SqliteCampaignRepository;
pub use connection::{create_pool, create_test_pool, ConnectionError, PoolConfig};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use trigger_config_repository::SqliteTriggerConfigRepository;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::DatabaseConfig;

/// Parse a UUID string from a SQLite row field.
pub fn parse_uuid(s: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Fixed-width RFC3339 so that stored timestamps sort lexically.
pub fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse an optional RFC3339 datetime string from a SQLite row field.
pub fn parse_optional_datetime(s: Option<String>) -> DomainResult<Option<DateTime<Utc>>> {
    s.as_deref().map(parse_datetime).transpose()
}

/// Parse a JSON column, naming the column in the error.
pub fn parse_json<T: DeserializeOwned>(column: &str, s: &str) -> DomainResult<T> {
    serde_json::from_str(s).map_err(|e| DomainError::SerializationError(format!("{column}: {e}")))
}

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// Open the configured database and bring its schema up to date.
pub async fn initialize_database(config: &DatabaseConfig) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(&config.url(), PoolConfig::from(config)).await?;
    Migrator::new(pool.clone()).run(&all_embedded_migrations()).await?;
    Ok(pool)
}

/// Create an in-memory pool with all migrations applied.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    Migrator::new(pool.clone()).run(&all_embedded_migrations()).await?;
    Ok(pool)
}
