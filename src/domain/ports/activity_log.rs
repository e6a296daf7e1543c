//! Append-only log of automated lifecycle actions.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::ActivityLogEntry;

#[async_trait]
pub trait ActivityLog: Send + Sync {
    /// Append entries in order.
    async fn append(&self, entries: &[ActivityLogEntry]) -> DomainResult<()>;

    /// Most recent entries, newest first. Entries sharing a timestamp are
    /// returned in reverse append order.
    async fn recent(&self, limit: usize) -> DomainResult<Vec<ActivityLogEntry>>;
}
