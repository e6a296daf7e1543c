//! Port for the external content collaborator.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::PostFormat;

/// Supplies candidate post copy for a format.
///
/// Implementations may serve a static template pool or call out to a
/// content-generation service; the lifecycle engine only picks among the
/// returned candidates.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    async fn templates_for(&self, format: PostFormat) -> DomainResult<Vec<String>>;
}
