//! In-memory implementations of the storage ports.
//!
//! Used by tests and for dry runs that should not touch the database.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AbTest, ActivityLogEntry, Campaign, TriggerConfig};
use crate::domain::ports::{AbTestRepository, ActivityLog, CampaignRepository, TriggerConfigStore};

/// Campaigns kept in insertion order.
#[derive(Default)]
pub struct InMemoryCampaignRepository {
    campaigns: RwLock<Vec<Campaign>>,
}

impl InMemoryCampaignRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_campaigns(campaigns: Vec<Campaign>) -> Self {
        Self {
            campaigns: RwLock::new(campaigns),
        }
    }
}

#[async_trait]
impl CampaignRepository for InMemoryCampaignRepository {
    async fn list(&self) -> DomainResult<Vec<Campaign>> {
        Ok(self.campaigns.read().await.clone())
    }

    async fn get(&self, id: &str) -> DomainResult<Option<Campaign>> {
        Ok(self.campaigns.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn save(&self, campaigns: &[Campaign]) -> DomainResult<()> {
        let mut stored = self.campaigns.write().await;
        for campaign in campaigns {
            match stored.iter_mut().find(|c| c.id == campaign.id) {
                Some(existing) => *existing = campaign.clone(),
                None => stored.push(campaign.clone()),
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryTriggerConfigStore {
    configs: RwLock<HashMap<String, TriggerConfig>>,
}

impl InMemoryTriggerConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configs(configs: impl IntoIterator<Item = TriggerConfig>) -> Self {
        Self {
            configs: RwLock::new(
                configs
                    .into_iter()
                    .map(|config| (config.persona.clone(), config))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl TriggerConfigStore for InMemoryTriggerConfigStore {
    async fn get(&self, persona: &str) -> DomainResult<Option<TriggerConfig>> {
        Ok(self.configs.read().await.get(persona).cloned())
    }

    async fn list(&self) -> DomainResult<Vec<TriggerConfig>> {
        let mut configs: Vec<_> = self.configs.read().await.values().cloned().collect();
        configs.sort_by(|a, b| a.persona.cmp(&b.persona));
        Ok(configs)
    }

    async fn upsert(&self, config: &TriggerConfig) -> DomainResult<()> {
        config.validate()?;
        self.configs
            .write()
            .await
            .insert(config.persona.clone(), config.clone());
        Ok(())
    }
}

/// Entries kept in append order.
#[derive(Default)]
pub struct InMemoryActivityLog {
    entries: RwLock<Vec<ActivityLogEntry>>,
}

impl InMemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityLog for InMemoryActivityLog {
    async fn append(&self, entries: &[ActivityLogEntry]) -> DomainResult<()> {
        self.entries.write().await.extend_from_slice(entries);
        Ok(())
    }

    async fn recent(&self, limit: usize) -> DomainResult<Vec<ActivityLogEntry>> {
        let entries = self.entries.read().await;
        // Reverse first so that a stable sort puts later appends first on ties.
        let mut newest: Vec<_> = entries.iter().rev().cloned().collect();
        newest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        newest.truncate(limit);
        Ok(newest)
    }
}

#[derive(Default)]
pub struct InMemoryAbTestRepository {
    tests: RwLock<Vec<AbTest>>,
}

impl InMemoryAbTestRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AbTestRepository for InMemoryAbTestRepository {
    async fn create(&self, test: &AbTest) -> DomainResult<()> {
        let mut tests = self.tests.write().await;
        if tests.iter().any(|t| t.id == test.id) {
            return Err(DomainError::ValidationFailed(format!(
                "A/B test {} already exists",
                test.id
            )));
        }
        tests.push(test.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<AbTest>> {
        Ok(self.tests.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn update(&self, test: &AbTest) -> DomainResult<()> {
        let mut tests = self.tests.write().await;
        let existing = tests
            .iter_mut()
            .find(|t| t.id == test.id)
            .ok_or(DomainError::AbTestNotFound(test.id))?;
        *existing = test.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> DomainResult<()> {
        let mut tests = self.tests.write().await;
        let before = tests.len();
        tests.retain(|t| t.id != id);
        if tests.len() == before {
            return Err(DomainError::AbTestNotFound(id));
        }
        Ok(())
    }

    async fn list(&self) -> DomainResult<Vec<AbTest>> {
        Ok(self.tests.read().await.clone())
    }

    async fn list_by_campaign(&self, campaign_id: &str) -> DomainResult<Vec<AbTest>> {
        Ok(self
            .tests
            .read()
            .await
            .iter()
            .filter(|t| t.campaign_id == campaign_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::LifecycleAction;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_campaign_save_upserts_in_place() {
        let repo = InMemoryCampaignRepository::with_campaigns(vec![
            Campaign::new("a", "medspa"),
            Campaign::new("b", "medspa"),
        ]);

        let updated = Campaign::new("a", "speaker");
        repo.save(&[updated, Campaign::new("c", "fitness")]).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(repo.get("a").await.unwrap().unwrap().persona, "speaker");
    }

    #[tokio::test]
    async fn test_activity_recent_newest_first() {
        let log = InMemoryActivityLog::new();
        let t0 = Utc::now();
        let first = ActivityLogEntry::new("a", LifecycleAction::Archive, 0.0, t0);
        let second = ActivityLogEntry::new("b", LifecycleAction::Archive, 0.0, t0);
        let third =
            ActivityLogEntry::new("c", LifecycleAction::Archive, 0.0, t0 + Duration::seconds(1));
        log.append(&[first, second]).await.unwrap();
        log.append(&[third]).await.unwrap();

        let recent = log.recent(2).await.unwrap();
        let ids: Vec<_> = recent.iter().map(|e| e.campaign_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
    }

    #[tokio::test]
    async fn test_trigger_store_rejects_invalid() {
        let store = InMemoryTriggerConfigStore::new();
        let bad = TriggerConfig::new("x", 0.01, 1.0, 0.05, 1);
        assert!(store.upsert(&bad).await.is_err());
        assert!(store.get("x").await.unwrap().is_none());
    }
}
