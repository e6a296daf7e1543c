//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use autopilot::adapters::content::StaticTemplateProvider;
use autopilot::adapters::memory::{
    InMemoryAbTestRepository, InMemoryActivityLog, InMemoryCampaignRepository,
    InMemoryTriggerConfigStore,
};
use autopilot::domain::models::{
    Campaign, CampaignAnalytics, CampaignStatus, NewAbTest, NewVariant, Post, PostFormat,
    PostStatus, TriggerConfig, VariantContent,
};
use autopilot::domain::ports::{ContentProvider, ManualClock};
use autopilot::services::lifecycle_controller::DEFAULT_TICK_BUDGET;
use autopilot::services::{AbTestService, LifecycleController, PostComposer};
use chrono::{DateTime, Duration, TimeZone, Utc};

/// Initialize tracing output captured by the test harness.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn analytics(reach: u64, likes: u64, comments: u64, shares: u64) -> CampaignAnalytics {
    CampaignAnalytics {
        reach,
        likes,
        comments,
        shares,
    }
}

pub fn post(campaign_id: &str, format: PostFormat, likes: u64, comments: u64) -> Post {
    Post {
        id: format!("{campaign_id}_{}_{likes}", format.as_str()),
        campaign_id: campaign_id.to_string(),
        format,
        content: "seed post".to_string(),
        platforms: vec!["instagram".to_string()],
        scheduled_for: fixed_now() - Duration::days(1),
        status: PostStatus::Published,
        auto_generated: false,
        extension_source: None,
        likes,
        comments,
        created_at: fixed_now() - Duration::days(2),
    }
}

pub fn live_campaign(id: &str, persona: &str, analytics: CampaignAnalytics) -> Campaign {
    Campaign::new(id, persona)
        .with_name(format!("Campaign {id}"))
        .with_status(CampaignStatus::Live)
        .with_analytics(analytics)
}

pub fn medspa_config() -> TriggerConfig {
    TriggerConfig::new("medspa", 0.025, 1.1, 0.015, 2).with_post_spacing(6)
}

/// In-memory wiring for the lifecycle controller.
pub struct LifecycleHarness {
    pub campaigns: Arc<InMemoryCampaignRepository>,
    pub triggers: Arc<InMemoryTriggerConfigStore>,
    pub activity_log: Arc<InMemoryActivityLog>,
    pub clock: Arc<ManualClock>,
    pub controller: Arc<LifecycleController>,
}

impl LifecycleHarness {
    pub fn new(campaigns: Vec<Campaign>, configs: Vec<TriggerConfig>) -> Self {
        Self::build(
            campaigns,
            configs,
            Arc::new(StaticTemplateProvider::default()),
            DEFAULT_TICK_BUDGET,
        )
    }

    pub fn with_provider(
        campaigns: Vec<Campaign>,
        configs: Vec<TriggerConfig>,
        provider: Arc<dyn ContentProvider>,
    ) -> Self {
        Self::build(campaigns, configs, provider, DEFAULT_TICK_BUDGET)
    }

    pub fn with_budget(
        campaigns: Vec<Campaign>,
        configs: Vec<TriggerConfig>,
        budget: std::time::Duration,
    ) -> Self {
        Self::build(
            campaigns,
            configs,
            Arc::new(StaticTemplateProvider::default()),
            budget,
        )
    }

    fn build(
        campaigns: Vec<Campaign>,
        configs: Vec<TriggerConfig>,
        provider: Arc<dyn ContentProvider>,
        budget: std::time::Duration,
    ) -> Self {
        let campaigns = Arc::new(InMemoryCampaignRepository::with_campaigns(campaigns));
        let triggers = Arc::new(InMemoryTriggerConfigStore::with_configs(configs));
        let activity_log = Arc::new(InMemoryActivityLog::new());
        let clock = Arc::new(ManualClock::new(fixed_now()));
        let composer = PostComposer::new(provider, Duration::hours(2), Some(42));
        let controller = LifecycleController::new(
            campaigns.clone(),
            triggers.clone(),
            activity_log.clone(),
            composer,
            clock.clone(),
        )
        .with_tick_budget(budget);
        Self {
            campaigns,
            triggers,
            activity_log,
            clock,
            controller: Arc::new(controller),
        }
    }
}

pub fn variant(headline: &str) -> Option<NewVariant> {
    Some(NewVariant {
        name: None,
        content: VariantContent {
            headline: headline.to_string(),
            cta: "Book now".to_string(),
            ..Default::default()
        },
    })
}

pub fn new_test(campaign_id: &str) -> NewAbTest {
    NewAbTest {
        campaign_id: campaign_id.to_string(),
        name: Some("Headline test".to_string()),
        variant_a: variant("Glow up this spring"),
        variant_b: variant("Spring glow: 20% off"),
        ..Default::default()
    }
}

pub fn ab_service() -> (AbTestService, Arc<InMemoryAbTestRepository>, Arc<ManualClock>) {
    let repo = Arc::new(InMemoryAbTestRepository::new());
    let clock = Arc::new(ManualClock::new(fixed_now()));
    (AbTestService::new(repo.clone(), clock.clone()), repo, clock)
}
