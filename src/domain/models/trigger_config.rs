//! Per-persona lifecycle thresholds.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Most posts one extension may synthesize.
pub const MAX_EXTENSION_POSTS: u32 = 24;

/// Widest allowed gap between synthesized posts: 30 days.
pub const MAX_POST_SPACING_HOURS: u32 = 24 * 30;

/// Thresholds the lifecycle controller applies to campaigns of one persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub persona: String,
    /// Engagement rate at or above which a campaign may be extended.
    pub min_engagement_rate: f64,
    /// Reach velocity at or above which a campaign may be extended.
    pub min_reach_velocity: f64,
    /// Engagement rate below which a campaign is archived.
    pub failure_threshold: f64,
    /// Number of posts synthesized on extension.
    pub extension_post_count: u32,
    /// Spacing between successive synthesized posts.
    pub max_post_spacing_hours: u32,
}

impl TriggerConfig {
    pub fn new(
        persona: impl Into<String>,
        min_engagement_rate: f64,
        min_reach_velocity: f64,
        failure_threshold: f64,
        extension_post_count: u32,
    ) -> Self {
        Self {
            persona: persona.into(),
            min_engagement_rate,
            min_reach_velocity,
            failure_threshold,
            extension_post_count,
            max_post_spacing_hours: 6,
        }
    }

    pub fn with_post_spacing(mut self, hours: u32) -> Self {
        self.max_post_spacing_hours = hours;
        self
    }

    /// Check that the thresholds describe a usable decision band.
    pub fn validate(&self) -> DomainResult<()> {
        if self.persona.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "persona cannot be empty".to_string(),
            ));
        }
        for (name, value) in [
            ("min_engagement_rate", self.min_engagement_rate),
            ("min_reach_velocity", self.min_reach_velocity),
            ("failure_threshold", self.failure_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::ValidationFailed(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.failure_threshold > self.min_engagement_rate {
            return Err(DomainError::ValidationFailed(format!(
                "failure_threshold ({}) must not exceed min_engagement_rate ({})",
                self.failure_threshold, self.min_engagement_rate
            )));
        }
        if self.extension_post_count == 0 || self.extension_post_count > MAX_EXTENSION_POSTS {
            return Err(DomainError::ValidationFailed(format!(
                "extension_post_count must be between 1 and {MAX_EXTENSION_POSTS}, got {}",
                self.extension_post_count
            )));
        }
        if self.max_post_spacing_hours > MAX_POST_SPACING_HOURS {
            return Err(DomainError::ValidationFailed(format!(
                "max_post_spacing_hours must be at most {MAX_POST_SPACING_HOURS}, got {}",
                self.max_post_spacing_hours
            )));
        }
        Ok(())
    }

    /// Built-in thresholds for the personas the dashboard ships with.
    pub fn defaults() -> Vec<TriggerConfig> {
        vec![
            Self::new("medspa", 0.025, 1.1, 0.015, 2).with_post_spacing(6),
            Self::new("speaker", 0.035, 1.15, 0.02, 1).with_post_spacing(8),
            Self::new("realestate", 0.02, 1.08, 0.012, 3).with_post_spacing(12),
            Self::new("restaurant", 0.03, 1.2, 0.018, 2).with_post_spacing(4),
            Self::new("fitness", 0.028, 1.12, 0.016, 2).with_post_spacing(6),
            Self::new("automotive", 0.022, 1.05, 0.014, 1).with_post_spacing(24),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let defaults = TriggerConfig::defaults();
        assert_eq!(defaults.len(), 6);
        for config in &defaults {
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_validate_inverted_band() {
        let config = TriggerConfig::new("x", 0.01, 1.0, 0.02, 1);
        assert!(matches!(
            config.validate(),
            Err(DomainError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_validate_zero_post_count() {
        let config = TriggerConfig::new("x", 0.03, 1.0, 0.01, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_upper_bounds() {
        let too_many = TriggerConfig::new("x", 0.03, 1.0, 0.01, MAX_EXTENSION_POSTS + 1);
        assert!(too_many.validate().is_err());
        let at_limit = TriggerConfig::new("x", 0.03, 1.0, 0.01, MAX_EXTENSION_POSTS)
            .with_post_spacing(MAX_POST_SPACING_HOURS);
        assert!(at_limit.validate().is_ok());
        let too_wide = TriggerConfig::new("x", 0.03, 1.0, 0.01, 2).with_post_spacing(u32::MAX);
        assert!(matches!(
            too_wide.validate(),
            Err(DomainError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_validate_nan() {
        let config = TriggerConfig::new("x", f64::NAN, 1.0, 0.01, 1);
        assert!(config.validate().is_err());
    }
}
