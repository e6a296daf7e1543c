pub mod activity;
pub mod campaign;
pub mod config;
pub mod insight;
pub mod trigger_config;

pub use ab_test::{
    AbTest, AbTestStatus, AbTestUpdate, MetricsUpdate, NewAbTest, NewVariant, TestType, Variant,
    VariantContent, VariantMetrics, VariantSlot,
};
pub use activity::{ActionKind, ActivityLogEntry, LifecycleAction};
pub use campaign::{
    Campaign, CampaignAnalytics, CampaignStatus, Post, PostFormat, PostStatus, DEFAULT_PLATFORMS,
};
pub use config::{Config, DatabaseConfig, EngineConfig, LoggingConfig};
pub use insight::{
    Impact, Insight, InsightKind, NextTestSuggestions, Priority, Recommendation,
    RecommendationAction, TestInsights, TestSuggestion, TestTemplate,
};
pub use trigger_config::{TriggerConfig, MAX_EXTENSION_POSTS, MAX_POST_SPACING_HOURS};
