//! SQLite adapter tests against a migrated in-memory database.

mod common;

use std::sync::Arc;

use autopilot::adapters::content::StaticTemplateProvider;
use autopilot::adapters::sqlite::{
    create_migrated_test_pool, initialize_database, SqliteAbTestRepository, SqliteActivityLog,
    SqliteCampaignRepository, SqliteTriggerConfigRepository,
};
use autopilot::domain::errors::DomainError;
use autopilot::domain::models::{
    ActivityLogEntry, CampaignStatus, DatabaseConfig, LifecycleAction, PostFormat, TriggerConfig,
    VariantSlot,
};
use autopilot::domain::ports::{
    AbTestRepository, ActivityLog, CampaignRepository, ManualClock, TriggerConfigStore,
};
use autopilot::services::{AbTestService, LifecycleController, PostComposer};
use chrono::Duration;
use uuid::Uuid;

use common::{analytics, fixed_now, live_campaign, medspa_config, new_test, post};

#[tokio::test]
async fn test_campaign_round_trip_and_upsert() {
    let pool = create_migrated_test_pool().await.unwrap();
    let repo = SqliteCampaignRepository::new(pool);

    let campaign = live_campaign("cmp_1", "medspa", analytics(2000, 120, 30, 10))
        .with_platforms(vec!["instagram".into(), "tiktok".into()])
        .with_posts(vec![post("cmp_1", PostFormat::Story, 10, 3)]);
    let other = live_campaign("cmp_2", "fitness", analytics(500, 5, 0, 0));
    repo.save(&[campaign.clone(), other]).await.unwrap();

    let loaded = repo.get("cmp_1").await.unwrap().unwrap();
    assert_eq!(loaded, campaign);

    let mut changed = loaded;
    changed.status = CampaignStatus::Archived;
    changed.archived_at = Some(fixed_now());
    repo.save(&[changed.clone()]).await.unwrap();

    let all = repo.list().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0], changed);
    assert_eq!(all[1].id, "cmp_2");
    assert!(repo.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_trigger_config_upsert_and_validation() {
    let pool = create_migrated_test_pool().await.unwrap();
    let store = SqliteTriggerConfigRepository::new(pool);

    for config in TriggerConfig::defaults() {
        store.upsert(&config).await.unwrap();
    }
    let personas: Vec<String> = store.list().await.unwrap().into_iter().map(|c| c.persona).collect();
    assert_eq!(
        personas,
        vec!["automotive", "fitness", "medspa", "realestate", "restaurant", "speaker"]
    );

    let tuned = TriggerConfig::new("medspa", 0.05, 1.5, 0.01, 4).with_post_spacing(3);
    store.upsert(&tuned).await.unwrap();
    assert_eq!(store.get("medspa").await.unwrap(), Some(tuned));

    let invalid = TriggerConfig::new("broken", 0.01, 1.0, 0.05, 1);
    assert!(matches!(
        store.upsert(&invalid).await,
        Err(DomainError::ValidationFailed(_))
    ));
    assert!(store.get("broken").await.unwrap().is_none());
}

#[tokio::test]
async fn test_activity_log_newest_first_with_ties() {
    let pool = create_migrated_test_pool().await.unwrap();
    let log = SqliteActivityLog::new(pool);

    let t0 = fixed_now();
    let first = ActivityLogEntry::new("a", LifecycleAction::Archive, 0.001, t0);
    let tied = ActivityLogEntry::new(
        "b",
        LifecycleAction::Pivot {
            from_format: PostFormat::Reels,
            to_format: PostFormat::Story,
        },
        0.02,
        t0,
    );
    let latest = ActivityLogEntry::new(
        "c",
        LifecycleAction::Extension {
            new_posts_count: 2,
            winning_format: PostFormat::Post,
        },
        0.08,
        t0 + Duration::milliseconds(5),
    );
    log.append(&[first.clone(), tied.clone()]).await.unwrap();
    log.append(&[latest.clone()]).await.unwrap();

    let recent = log.recent(10).await.unwrap();
    assert_eq!(recent, vec![latest, tied, first]);
    assert_eq!(log.recent(1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_ab_test_repository_crud() {
    let pool = create_migrated_test_pool().await.unwrap();
    let repo = Arc::new(SqliteAbTestRepository::new(pool));
    let clock = Arc::new(ManualClock::new(fixed_now()));
    let service = AbTestService::new(repo.clone(), clock.clone());

    let first = service.create_test(new_test("cmp_1")).await.unwrap();
    clock.advance(Duration::seconds(1));
    let second = service.create_test(new_test("cmp_2")).await.unwrap();

    assert_eq!(repo.get(first.id).await.unwrap(), Some(first.clone()));
    assert_eq!(repo.list().await.unwrap().len(), 2);
    let for_campaign = repo.list_by_campaign("cmp_2").await.unwrap();
    assert_eq!(for_campaign, vec![second.clone()]);

    service.start_test(first.id).await.unwrap();
    let stopped = service
        .stop_test(first.id, Some(VariantSlot::VariantB))
        .await
        .unwrap();
    assert_eq!(repo.get(first.id).await.unwrap(), Some(stopped));

    repo.delete(second.id).await.unwrap();
    assert!(matches!(
        repo.delete(second.id).await,
        Err(DomainError::AbTestNotFound(_))
    ));

    let mut ghost = first;
    ghost.id = Uuid::new_v4();
    assert!(matches!(
        repo.update(&ghost).await,
        Err(DomainError::AbTestNotFound(_))
    ));
}

#[tokio::test]
async fn test_lifecycle_tick_against_sqlite() {
    let pool = create_migrated_test_pool().await.unwrap();
    let campaigns = Arc::new(SqliteCampaignRepository::new(pool.clone()));
    let triggers = Arc::new(SqliteTriggerConfigRepository::new(pool.clone()));
    let activity_log = Arc::new(SqliteActivityLog::new(pool));
    triggers.upsert(&medspa_config()).await.unwrap();
    campaigns
        .save(&[
            live_campaign("good", "medspa", analytics(2000, 120, 30, 10)),
            live_campaign("bad", "medspa", analytics(10_000, 50, 10, 0)),
        ])
        .await
        .unwrap();

    let controller = LifecycleController::new(
        campaigns.clone(),
        triggers,
        activity_log,
        PostComposer::new(Arc::new(StaticTemplateProvider::default()), Duration::hours(2), Some(1)),
        Arc::new(ManualClock::new(fixed_now())),
    );
    let report = controller.run_tick().await.unwrap();
    assert_eq!(report.actions.len(), 2);

    let good = campaigns.get("good").await.unwrap().unwrap();
    assert_eq!(good.status, CampaignStatus::Extended);
    assert_eq!(good.posts.len(), 2);
    let bad = campaigns.get("bad").await.unwrap().unwrap();
    assert_eq!(bad.status, CampaignStatus::Archived);

    let recent = controller.get_recent_actions(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    // Same timestamp, so reverse append order.
    assert_eq!(recent[0].campaign_id, "bad");
    assert_eq!(recent[1].campaign_id, "good");
}

#[tokio::test]
async fn test_file_database_is_created_and_migrated_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = DatabaseConfig {
        path: dir.path().join("nested/autopilot.db").display().to_string(),
        ..Default::default()
    };

    let pool = initialize_database(&config).await.unwrap();
    SqliteTriggerConfigRepository::new(pool.clone())
        .upsert(&medspa_config())
        .await
        .unwrap();
    pool.close().await;

    let pool = initialize_database(&config).await.unwrap();
    let store = SqliteTriggerConfigRepository::new(pool);
    assert!(store.get("medspa").await.unwrap().is_some());
}

#[tokio::test]
async fn test_corrupt_campaign_row_does_not_block_tick() {
    let pool = create_migrated_test_pool().await.unwrap();
    let campaigns = Arc::new(SqliteCampaignRepository::new(pool.clone()));
    let triggers = Arc::new(SqliteTriggerConfigRepository::new(pool.clone()));
    let activity_log = Arc::new(SqliteActivityLog::new(pool.clone()));
    triggers.upsert(&medspa_config()).await.unwrap();
    campaigns
        .save(&[
            live_campaign("good", "medspa", analytics(2000, 120, 30, 10)),
            live_campaign("bad", "medspa", analytics(10_000, 50, 10, 0)),
            live_campaign("weak", "medspa", analytics(10_000, 40, 0, 0)),
        ])
        .await
        .unwrap();
    sqlx::query("UPDATE campaigns SET posts = '{not json' WHERE id = 'bad'")
        .execute(&pool)
        .await
        .unwrap();

    let batch = campaigns.load_batch().await.unwrap();
    assert_eq!(batch.campaigns.len(), 2);
    assert_eq!(batch.unreadable.len(), 1);
    assert_eq!(batch.unreadable[0].id, "bad");
    assert_eq!(campaigns.list().await.unwrap().len(), 2);

    let controller = LifecycleController::new(
        campaigns.clone(),
        triggers,
        activity_log,
        PostComposer::new(Arc::new(StaticTemplateProvider::default()), Duration::hours(2), Some(1)),
        Arc::new(ManualClock::new(fixed_now())),
    );
    let report = controller.run_tick().await.unwrap();
    assert_eq!(report.failed, 1);
    let acted: Vec<&str> = report.actions.iter().map(|e| e.campaign_id.as_str()).collect();
    assert_eq!(acted, vec!["good", "weak"]);

    let good = campaigns.get("good").await.unwrap().unwrap();
    assert_eq!(good.status, CampaignStatus::Extended);
    let weak = campaigns.get("weak").await.unwrap().unwrap();
    assert_eq!(weak.status, CampaignStatus::Archived);

    let (status, posts): (String, String) =
        sqlx::query_as("SELECT status, posts FROM campaigns WHERE id = 'bad'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(status, "live");
    assert_eq!(posts, "{not json");
}
