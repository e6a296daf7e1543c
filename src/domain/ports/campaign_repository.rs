//! Repository port for campaign persistence.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::Campaign;

/// A stored campaign that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableCampaign {
    pub id: String,
    pub error: String,
}

/// Campaigns loaded for a lifecycle pass, plus the records that were skipped.
#[derive(Debug, Clone, Default)]
pub struct CampaignBatch {
    pub campaigns: Vec<Campaign>,
    pub unreadable: Vec<UnreadableCampaign>,
}

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// List all readable campaigns, posts included.
    async fn list(&self) -> DomainResult<Vec<Campaign>>;

    /// Load every campaign, decoding records one at a time. Records that fail
    /// to decode are reported in `unreadable` and left untouched in storage.
    async fn load_batch(&self) -> DomainResult<CampaignBatch> {
        Ok(CampaignBatch {
            campaigns: self.list().await?,
            unreadable: Vec::new(),
        })
    }

    /// Get a campaign by ID.
    async fn get(&self, id: &str) -> DomainResult<Option<Campaign>>;

    /// Persist the given campaigns atomically, inserting or replacing each.
    /// Records not in `campaigns` are not modified.
    async fn save(&self, campaigns: &[Campaign]) -> DomainResult<()>;
}
