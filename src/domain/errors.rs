//! Domain errors for the autopilot engine.

use thiserror::Error;
use uuid::Uuid;

/// Domain-level errors that can occur in the autopilot engine.
///
/// Insufficient sample sizes and personas without trigger thresholds are not
/// errors: the first is modelled as `None` significance, the second as a
/// silent skip inside the lifecycle tick.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("A/B test not found")]
    AbTestNotFound(Uuid),

    #[error("Variant not found")]
    VariantNotFound(Uuid),

    #[error("Campaign not found: {0}")]
    CampaignNotFound(String),

    /// Illegal state transition. The message is surfaced verbatim to callers.
    #[error("{0}")]
    InvalidState(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("No content templates available for format '{0}'")]
    ContentUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// True for errors that mean the addressed entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AbTestNotFound(_) | Self::VariantNotFound(_) | Self::CampaignNotFound(_)
        )
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            DomainError::AbTestNotFound(Uuid::new_v4()).to_string(),
            "A/B test not found"
        );
        assert_eq!(
            DomainError::VariantNotFound(Uuid::new_v4()).to_string(),
            "Variant not found"
        );
        assert_eq!(
            DomainError::InvalidState("Can only start tests in draft status".to_string())
                .to_string(),
            "Can only start tests in draft status"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::CampaignNotFound("c1".into()).is_not_found());
        assert!(!DomainError::ValidationFailed("x".into()).is_not_found());
    }
}
