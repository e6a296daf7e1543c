//! SQLite adapter for the ActivityLog.

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::adapters::sqlite::{format_datetime, parse_datetime, parse_json, parse_uuid};
use crate::domain::errors::DomainResult;
use crate::domain::models::{ActivityLogEntry, LifecycleAction};
use crate::domain::ports::ActivityLog;

#[derive(Clone)]
pub struct SqliteActivityLog {
    pool: SqlitePool,
}

impl SqliteActivityLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: String,
    campaign_id: String,
    action_data: String,
    reason: String,
    engagement_rate: f64,
    timestamp: String,
}

fn row_to_entry(row: ActivityRow) -> DomainResult<ActivityLogEntry> {
    let action: LifecycleAction = parse_json("action_data", &row.action_data)?;
    Ok(ActivityLogEntry {
        id: parse_uuid(&row.id)?,
        campaign_id: row.campaign_id,
        timestamp: parse_datetime(&row.timestamp)?,
        reason: row.reason,
        engagement_rate: row.engagement_rate,
        action,
    })
}

#[async_trait]
impl ActivityLog for SqliteActivityLog {
    async fn append(&self, entries: &[ActivityLogEntry]) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            let action_data = serde_json::to_string(&entry.action)?;
            sqlx::query(
                "INSERT INTO activity_log
                 (id, campaign_id, action_type, action_data, reason, engagement_rate, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(entry.id.to_string())
            .bind(&entry.campaign_id)
            .bind(entry.kind().as_str())
            .bind(&action_data)
            .bind(&entry.reason)
            .bind(entry.engagement_rate)
            .bind(format_datetime(entry.timestamp))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> DomainResult<Vec<ActivityLogEntry>> {
        let rows: Vec<ActivityRow> = sqlx::query_as(
            "SELECT id, campaign_id, action_data, reason, engagement_rate, timestamp
             FROM activity_log ORDER BY timestamp DESC, seq DESC LIMIT ?",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_entry).collect()
    }
}
