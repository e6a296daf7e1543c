//! Scheduler timing tests on a paused tokio clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use autopilot::domain::models::CampaignStatus;
use autopilot::domain::ports::CampaignRepository;
use autopilot::services::{LifecycleScheduler, SchedulerConfig};

use common::{analytics, live_campaign, medspa_config, LifecycleHarness};

fn scheduler_for(harness: &LifecycleHarness, config: SchedulerConfig) -> LifecycleScheduler {
    LifecycleScheduler::new(Arc::clone(&harness.controller), config)
}

#[tokio::test(start_paused = true)]
async fn test_ticks_on_interval_and_acts_once() {
    let harness = LifecycleHarness::new(
        vec![live_campaign("weak", "medspa", analytics(10_000, 50, 10, 0))],
        vec![medspa_config()],
    );
    let scheduler = scheduler_for(&harness, SchedulerConfig::with_interval(Duration::from_secs(60)));

    assert!(scheduler.start());
    tokio::time::sleep(Duration::from_secs(150)).await;
    scheduler.stop().await;

    let status = scheduler.status().await;
    assert!(!status.running);
    assert_eq!(status.total_ticks, 3);
    assert_eq!(status.successful_ticks, 3);
    assert_eq!(status.failed_ticks, 0);
    assert_eq!(status.total_actions, 1);
    assert!(status.last_tick.is_some());

    let stored = harness.campaigns.get("weak").await.unwrap().unwrap();
    assert_eq!(stored.status, CampaignStatus::Archived);
}

#[tokio::test(start_paused = true)]
async fn test_no_startup_tick_when_disabled() {
    let harness = LifecycleHarness::new(vec![], vec![medspa_config()]);
    let config = SchedulerConfig {
        check_interval: Duration::from_secs(60),
        run_on_startup: false,
    };
    let scheduler = scheduler_for(&harness, config);

    scheduler.start();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(scheduler.status().await.total_ticks, 0);

    tokio::time::sleep(Duration::from_secs(40)).await;
    assert_eq!(scheduler.status().await.total_ticks, 1);
    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_start_and_stop_are_idempotent() {
    let harness = LifecycleHarness::new(vec![], vec![]);
    let scheduler = scheduler_for(&harness, SchedulerConfig::default());

    assert!(scheduler.start());
    assert!(!scheduler.start());

    scheduler.stop().await;
    scheduler.stop().await;
    assert!(scheduler.is_stop_requested());

    let ticks = scheduler.status().await.total_ticks;
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(scheduler.status().await.total_ticks, ticks);
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_start_prevents_ticking() {
    let harness = LifecycleHarness::new(
        vec![live_campaign("weak", "medspa", analytics(10_000, 50, 10, 0))],
        vec![medspa_config()],
    );
    let scheduler = scheduler_for(&harness, SchedulerConfig::with_interval(Duration::from_secs(60)));
    scheduler.stop().await;
    assert!(!scheduler.status().await.running);

    assert!(!scheduler.start());
    tokio::time::sleep(Duration::from_secs(300)).await;

    let status = scheduler.status().await;
    assert!(!status.running);
    assert_eq!(status.total_ticks, 0);
    let stored = harness.campaigns.get("weak").await.unwrap().unwrap();
    assert_eq!(stored.status, CampaignStatus::Live);
}

#[tokio::test]
async fn test_run_once_outside_timer() {
    let harness = LifecycleHarness::new(
        vec![live_campaign("weak", "medspa", analytics(10_000, 50, 10, 0))],
        vec![medspa_config()],
    );
    let scheduler = scheduler_for(&harness, SchedulerConfig::default());

    let report = scheduler.run_once().await.unwrap();
    assert_eq!(report.actions.len(), 1);
    assert_eq!(scheduler.status().await.total_ticks, 0);
}
