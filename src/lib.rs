//! Autopilot - autonomous campaign lifecycle and A/B experiment analysis
//!
//! A periodic lifecycle controller evaluates live social campaigns against
//! per-persona engagement thresholds and extends, pivots or archives them,
//! recording every automated action in an append-only activity log. An A/B
//! test service manages experiments through their draft, active, paused and
//! completed states, computes two-proportion significance on conversion
//! rates, auto-concludes tests that reach their target confidence, and
//! derives insights, recommendations and follow-up test suggestions.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): lifecycle control, scheduling, statistics
//! - **Adapters** (`adapters`): SQLite, in-memory and content-template implementations
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{DomainError, DomainResult};
pub use domain::models::{
    AbTest, AbTestStatus, ActivityLogEntry, Campaign, CampaignStatus, Config, LifecycleAction,
    PostFormat, TriggerConfig, VariantSlot,
};
pub use domain::ports::{
    AbTestRepository, ActivityLog, CampaignRepository, Clock, ContentProvider, TriggerConfigStore,
};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AbTestService, LifecycleController, LifecycleScheduler, SchedulerConfig};
