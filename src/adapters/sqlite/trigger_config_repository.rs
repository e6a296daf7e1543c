//! SQLite adapter for TriggerConfigStore.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::domain::errors::DomainResult;
use crate::domain::models::TriggerConfig;
use crate::domain::ports::TriggerConfigStore;

#[derive(Clone)]
pub struct SqliteTriggerConfigRepository {
    pool: SqlitePool,
}

impl SqliteTriggerConfigRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TriggerConfigRow {
    persona: String,
    min_engagement_rate: f64,
    min_reach_velocity: f64,
    failure_threshold: f64,
    extension_post_count: i64,
    max_post_spacing_hours: i64,
}

impl From<TriggerConfigRow> for TriggerConfig {
    fn from(row: TriggerConfigRow) -> Self {
        Self {
            persona: row.persona,
            min_engagement_rate: row.min_engagement_rate,
            min_reach_velocity: row.min_reach_velocity,
            failure_threshold: row.failure_threshold,
            extension_post_count: row.extension_post_count as u32,
            max_post_spacing_hours: row.max_post_spacing_hours as u32,
        }
    }
}

const SELECT_COLUMNS: &str = "SELECT persona, min_engagement_rate, min_reach_velocity,
    failure_threshold, extension_post_count, max_post_spacing_hours FROM trigger_configs";

#[async_trait]
impl TriggerConfigStore for SqliteTriggerConfigRepository {
    async fn get(&self, persona: &str) -> DomainResult<Option<TriggerConfig>> {
        let row: Option<TriggerConfigRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} WHERE persona = ?"))
                .bind(persona)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(TriggerConfig::from))
    }

    async fn list(&self) -> DomainResult<Vec<TriggerConfig>> {
        let rows: Vec<TriggerConfigRow> =
            sqlx::query_as(&format!("{SELECT_COLUMNS} ORDER BY persona"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(TriggerConfig::from).collect())
    }

    async fn upsert(&self, config: &TriggerConfig) -> DomainResult<()> {
        config.validate()?;

        sqlx::query(
            "INSERT INTO trigger_configs
             (persona, min_engagement_rate, min_reach_velocity, failure_threshold,
              extension_post_count, max_post_spacing_hours, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, datetime('now'))
             ON CONFLICT(persona) DO UPDATE SET
              min_engagement_rate = excluded.min_engagement_rate,
              min_reach_velocity = excluded.min_reach_velocity,
              failure_threshold = excluded.failure_threshold,
              extension_post_count = excluded.extension_post_count,
              max_post_spacing_hours = excluded.max_post_spacing_hours,
              updated_at = excluded.updated_at",
        )
        .bind(&config.persona)
        .bind(config.min_engagement_rate)
        .bind(config.min_reach_velocity)
        .bind(config.failure_threshold)
        .bind(i64::from(config.extension_post_count))
        .bind(i64::from(config.max_post_spacing_hours))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
