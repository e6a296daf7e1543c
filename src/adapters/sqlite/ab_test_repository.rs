//! SQLite adapter for AbTestRepository.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{format_datetime, parse_datetime, parse_json, parse_optional_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AbTest, AbTestStatus, TestType, Variant, VariantSlot};
use crate::domain::ports::AbTestRepository;

#[derive(Clone)]
pub struct SqliteAbTestRepository {
    pool: SqlitePool,
}

impl SqliteAbTestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AbTestRow {
    id: String,
    campaign_id: String,
    name: String,
    status: String,
    start_date: Option<String>,
    end_date: Option<String>,
    duration_days: i64,
    confidence_level: f64,
    traffic_split: i64,
    variant_a: String,
    variant_b: String,
    hypothesis: String,
    test_type: String,
    platforms: String,
    winner: Option<String>,
    significance: Option<f64>,
    created_at: String,
    updated_at: String,
}

fn row_to_test(row: AbTestRow) -> DomainResult<AbTest> {
    let status = AbTestStatus::from_str(&row.status).ok_or_else(|| {
        DomainError::SerializationError(format!("unknown test status '{}'", row.status))
    })?;
    let winner = row
        .winner
        .as_deref()
        .map(|w| {
            VariantSlot::from_str(w)
                .ok_or_else(|| DomainError::SerializationError(format!("unknown winner '{w}'")))
        })
        .transpose()?;
    let variant_a: Variant = parse_json("variant_a", &row.variant_a)?;
    let variant_b: Variant = parse_json("variant_b", &row.variant_b)?;

    Ok(AbTest {
        id: parse_uuid(&row.id)?,
        campaign_id: row.campaign_id,
        name: row.name,
        status,
        start_date: parse_optional_datetime(row.start_date)?,
        end_date: parse_optional_datetime(row.end_date)?,
        duration_days: row.duration_days as u32,
        confidence_level: row.confidence_level,
        traffic_split: row.traffic_split as u8,
        variant_a,
        variant_b,
        hypothesis: row.hypothesis,
        test_type: TestType::from_str(&row.test_type).unwrap_or_default(),
        platforms: parse_json("platforms", &row.platforms)?,
        winner,
        significance: row.significance,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

#[async_trait]
impl AbTestRepository for SqliteAbTestRepository {
    async fn create(&self, test: &AbTest) -> DomainResult<()> {
        let variant_a = serde_json::to_string(&test.variant_a)?;
        let variant_b = serde_json::to_string(&test.variant_b)?;
        let platforms = serde_json::to_string(&test.platforms)?;

        sqlx::query(
            "INSERT INTO ab_tests
             (id, campaign_id, name, status, start_date, end_date, duration_days,
              confidence_level, traffic_split, variant_a, variant_b, hypothesis,
              test_type, platforms, winner, significance, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        )
        .bind(test.id.to_string())
        .bind(&test.campaign_id)
        .bind(&test.name)
        .bind(test.status.as_str())
        .bind(test.start_date.map(format_datetime))
        .bind(test.end_date.map(format_datetime))
        .bind(i64::from(test.duration_days))
        .bind(test.confidence_level)
        .bind(i64::from(test.traffic_split))
        .bind(&variant_a)
        .bind(&variant_b)
        .bind(&test.hypothesis)
        .bind(test.test_type.as_str())
        .bind(&platforms)
        .bind(test.winner.map(|w| w.as_str()))
        .bind(test.significance)
        .bind(format_datetime(test.created_at))
        .bind(format_datetime(test.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<AbTest>> {
        let row: Option<AbTestRow> = sqlx::query_as("SELECT * FROM ab_tests WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(row_to_test).transpose()
    }

    async fn update(&self, test: &AbTest) -> DomainResult<()> {
        let variant_a = serde_json::to_string(&test.variant_a)?;
        let variant_b = serde_json::to_string(&test.variant_b)?;
        let platforms = serde_json::to_string(&test.platforms)?;

        let result = sqlx::query(
            "UPDATE ab_tests SET
             campaign_id = ?2, name = ?3, status = ?4, start_date = ?5, end_date = ?6,
             duration_days = ?7, confidence_level = ?8, traffic_split = ?9,
             variant_a = ?10, variant_b = ?11, hypothesis = ?12, test_type = ?13,
             platforms = ?14, winner = ?15, significance = ?16, updated_at = ?17
             WHERE id = ?1",
        )
        .bind(test.id.to_string())
        .bind(&test.campaign_id)
        .bind(&test.name)
        .bind(test.status.as_str())
        .bind(test.start_date.map(format_datetime))
        .bind(test.end_date.map(format_datetime))
        .bind(i64::from(test.duration_days))
        .bind(test.confidence_level)
        .bind(i64::from(test.traffic_split))
        .bind(&variant_a)
        .bind(&variant_b)
        .bind(&test.hypothesis)
        .bind(test.test_type.as_str())
        .bind(&platforms)
        .bind(test.winner.map(|w| w.as_str()))
        .bind(test.significance)
        .bind(format_datetime(test.updated_at))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AbTestNotFound(test.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM ab_tests WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AbTestNotFound(id));
        }
        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<AbTest>> {
        let rows: Vec<AbTestRow> =
            sqlx::query_as("SELECT * FROM ab_tests ORDER BY created_at ASC, rowid ASC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(row_to_test).collect()
    }

    async fn list_by_campaign(&self, campaign_id: &str) -> DomainResult<Vec<AbTest>> {
        let rows: Vec<AbTestRow> = sqlx::query_as(
            "SELECT * FROM ab_tests WHERE campaign_id = ? ORDER BY created_at ASC, rowid ASC",
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_test).collect()
    }
}
