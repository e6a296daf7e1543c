//! Repository port for A/B test persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::AbTest;

#[async_trait]
pub trait AbTestRepository: Send + Sync {
    async fn create(&self, test: &AbTest) -> DomainResult<()>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<AbTest>>;

    async fn update(&self, test: &AbTest) -> DomainResult<()>;

    async fn delete(&self, id: Uuid) -> DomainResult<()>;

    /// List all tests, oldest first.
    async fn list(&self) -> DomainResult<Vec<AbTest>>;

    async fn list_by_campaign(&self, campaign_id: &str) -> DomainResult<Vec<AbTest>>;
}
