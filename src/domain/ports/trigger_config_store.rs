//! Store port for per-persona trigger thresholds.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::TriggerConfig;

#[async_trait]
pub trait TriggerConfigStore: Send + Sync {
    /// Get the thresholds for a persona, if any are configured.
    async fn get(&self, persona: &str) -> DomainResult<Option<TriggerConfig>>;

    /// List every configured persona.
    async fn list(&self) -> DomainResult<Vec<TriggerConfig>>;

    /// Insert or replace the thresholds for `config.persona`.
    async fn upsert(&self, config: &TriggerConfig) -> DomainResult<()>;
}
