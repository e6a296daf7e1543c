//! SQLite adapter for CampaignRepository.

use async_trait::async_trait;
use sqlx::{FromRow, Row, SqlitePool};
use tracing::error;

use crate::adapters::sqlite::{format_datetime, parse_datetime, parse_json, parse_optional_datetime};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Campaign, CampaignAnalytics, CampaignStatus, Post};
use crate::domain::ports::{CampaignBatch, CampaignRepository, UnreadableCampaign};

#[derive(Clone)]
pub struct SqliteCampaignRepository {
    pool: SqlitePool,
}

impl SqliteCampaignRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CampaignRow {
    id: String,
    name: String,
    persona: String,
    status: String,
    platforms: String,
    posts: String,
    analytics: Option<String>,
    extensions: i64,
    last_extension: Option<String>,
    last_pivot: Option<String>,
    archived_at: Option<String>,
    created_at: String,
    updated_at: String,
}

fn row_to_campaign(row: CampaignRow) -> DomainResult<Campaign> {
    let status = CampaignStatus::from_str(&row.status).ok_or_else(|| {
        DomainError::SerializationError(format!("unknown campaign status '{}'", row.status))
    })?;
    let platforms: Vec<String> = parse_json("platforms", &row.platforms)?;
    let posts: Vec<Post> = parse_json("posts", &row.posts)?;
    let analytics: Option<CampaignAnalytics> = row
        .analytics
        .as_deref()
        .map(|s| parse_json("analytics", s))
        .transpose()?;

    Ok(Campaign {
        id: row.id,
        name: row.name,
        persona: row.persona,
        status,
        platforms,
        posts,
        analytics,
        extensions: row.extensions as u32,
        last_extension: parse_optional_datetime(row.last_extension)?,
        last_pivot: parse_optional_datetime(row.last_pivot)?,
        archived_at: parse_optional_datetime(row.archived_at)?,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

#[async_trait]
impl CampaignRepository for SqliteCampaignRepository {
    async fn list(&self) -> DomainResult<Vec<Campaign>> {
        Ok(self.load_batch().await?.campaigns)
    }

    async fn load_batch(&self) -> DomainResult<CampaignBatch> {
        let rows = sqlx::query("SELECT * FROM campaigns ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        let mut batch = CampaignBatch::default();
        for row in rows {
            let decoded = CampaignRow::from_row(&row)
                .map_err(DomainError::from)
                .and_then(row_to_campaign);
            match decoded {
                Ok(campaign) => batch.campaigns.push(campaign),
                Err(e) => {
                    let id = row
                        .try_get::<String, _>("id")
                        .unwrap_or_else(|_| "<unknown>".to_string());
                    error!(campaign_id = %id, error = %e, "skipping unreadable campaign row");
                    batch.unreadable.push(UnreadableCampaign {
                        id,
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(batch)
    }

    async fn get(&self, id: &str) -> DomainResult<Option<Campaign>> {
        let row: Option<CampaignRow> = sqlx::query_as("SELECT * FROM campaigns WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_campaign).transpose()
    }

    /// Upsert every campaign in one transaction.
    async fn save(&self, campaigns: &[Campaign]) -> DomainResult<()> {
        let mut tx = self.pool.begin().await?;

        for campaign in campaigns {
            let platforms = serde_json::to_string(&campaign.platforms)?;
            let posts = serde_json::to_string(&campaign.posts)?;
            let analytics = campaign
                .analytics
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?;

            sqlx::query(
                "INSERT INTO campaigns
                 (id, name, persona, status, platforms, posts, analytics, extensions,
                  last_extension, last_pivot, archived_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                 ON CONFLICT(id) DO UPDATE SET
                  name = excluded.name, persona = excluded.persona, status = excluded.status,
                  platforms = excluded.platforms, posts = excluded.posts,
                  analytics = excluded.analytics, extensions = excluded.extensions,
                  last_extension = excluded.last_extension, last_pivot = excluded.last_pivot,
                  archived_at = excluded.archived_at, updated_at = excluded.updated_at",
            )
            .bind(&campaign.id)
            .bind(&campaign.name)
            .bind(&campaign.persona)
            .bind(campaign.status.as_str())
            .bind(&platforms)
            .bind(&posts)
            .bind(&analytics)
            .bind(i64::from(campaign.extensions))
            .bind(campaign.last_extension.map(format_datetime))
            .bind(campaign.last_pivot.map(format_datetime))
            .bind(campaign.archived_at.map(format_datetime))
            .bind(format_datetime(campaign.created_at))
            .bind(format_datetime(campaign.updated_at))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
