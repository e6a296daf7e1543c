//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the async trait interfaces that adapters implement:
//! - CampaignRepository: campaign records and their posts
//! - TriggerConfigStore: per-persona lifecycle thresholds
//! - ActivityLog: append-only record of automated actions
//! - AbTestRepository: A/B test persistence
//! - ContentProvider: post copy for synthesized posts
//! - Clock: the source of "now"
//!
//! These traits keep the lifecycle and statistics logic independent of
//! storage and content generation.

pub mod ab_test_repository;
pub mod activity_log;
pub mod campaign_repository;
pub mod clock;
pub mod content_provider;
pub mod trigger_config_store;

pub use ab_test_repository::AbTestRepository;
pub use activity_log::ActivityLog;
pub use campaign_repository::{CampaignBatch, CampaignRepository, UnreadableCampaign};
pub use clock::{Clock, ManualClock, SystemClock};
pub use content_provider::ContentProvider;
pub use trigger_config_store::TriggerConfigStore;
