//! Short ID prefix resolution for A/B test commands.
//!
//! Any unique prefix of a test UUID is accepted, similar to git short hashes.

use anyhow::{bail, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

const AB_TEST_QUERY: &str = "SELECT id FROM ab_tests WHERE id LIKE ? ORDER BY created_at";

/// Resolve an A/B test ID prefix to a full UUID.
pub async fn resolve_ab_test_id(pool: &SqlitePool, prefix: &str) -> Result<Uuid> {
    if let Ok(uuid) = Uuid::parse_str(prefix) {
        return Ok(uuid);
    }

    validate_prefix(prefix)?;

    let rows: Vec<(String,)> = sqlx::query_as(AB_TEST_QUERY)
        .bind(format!("{}%", prefix.to_lowercase()))
        .fetch_all(pool)
        .await?;

    match rows.as_slice() {
        [] => bail!("No A/B test found matching '{prefix}'"),
        [(id,)] => Ok(Uuid::parse_str(id)?),
        _ => {
            let mut msg = format!(
                "Ambiguous prefix '{prefix}': matches {} A/B tests:",
                rows.len()
            );
            for (id,) in &rows {
                msg.push_str(&format!("\n  {id}"));
            }
            bail!("{msg}")
        }
    }
}

fn validate_prefix(prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        bail!("ID prefix must not be empty");
    }
    if !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        bail!("Invalid ID prefix '{prefix}': must contain only hex characters and dashes");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapters::sqlite::{create_migrated_test_pool, SqliteAbTestRepository};
    use crate::domain::models::{NewAbTest, NewVariant, VariantContent};
    use crate::domain::ports::SystemClock;
    use crate::services::AbTestService;

    fn variant(headline: &str) -> Option<NewVariant> {
        Some(NewVariant {
            name: None,
            content: VariantContent {
                headline: headline.to_string(),
                ..Default::default()
            },
        })
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("").is_err());
        assert!(validate_prefix("xyz").is_err());
        assert!(validate_prefix("ab12-").is_ok());
    }

    #[tokio::test]
    async fn test_resolves_unique_prefix() {
        let pool = create_migrated_test_pool().await.unwrap();
        let service = AbTestService::new(
            Arc::new(SqliteAbTestRepository::new(pool.clone())),
            Arc::new(SystemClock),
        );
        let test = service
            .create_test(NewAbTest {
                campaign_id: "cmp_1".into(),
                variant_a: variant("Book now"),
                variant_b: variant("Reserve today"),
                ..Default::default()
            })
            .await
            .unwrap();

        let id = test.id.to_string();
        assert_eq!(resolve_ab_test_id(&pool, &id[..8]).await.unwrap(), test.id);
        assert_eq!(resolve_ab_test_id(&pool, &id).await.unwrap(), test.id);
        assert_eq!(
            resolve_ab_test_id(&pool, &id[..8].to_uppercase()).await.unwrap(),
            test.id
        );
    }

    #[tokio::test]
    async fn test_unknown_prefix_fails() {
        let pool = create_migrated_test_pool().await.unwrap();
        let err = resolve_ab_test_id(&pool, "abc").await.unwrap_err();
        assert!(err.to_string().contains("No A/B test found"));
    }
}
