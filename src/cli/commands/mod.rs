//! Subcommand implementations.

pub mod abtest;
pub mod campaign;
pub mod init;
pub mod run;
pub mod trigger;

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;

use crate::adapters::content::StaticTemplateProvider;
use crate::adapters::sqlite::{
    initialize_database, SqliteAbTestRepository, SqliteActivityLog, SqliteCampaignRepository,
    SqliteTriggerConfigRepository,
};
use crate::domain::models::Config;
use crate::domain::ports::{Clock, SystemClock};
use crate::services::{AbTestService, LifecycleController, PostComposer};

/// Database-backed wiring shared by the subcommands.
pub struct AppContext {
    pub config: Config,
    pub pool: SqlitePool,
    pub campaigns: Arc<SqliteCampaignRepository>,
    pub triggers: Arc<SqliteTriggerConfigRepository>,
    pub activity_log: Arc<SqliteActivityLog>,
    pub ab_tests: Arc<SqliteAbTestRepository>,
    pub clock: Arc<dyn Clock>,
}

impl AppContext {
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = initialize_database(&config.database)
            .await
            .context("Failed to initialize database. Run 'autopilot init' first.")?;

        Ok(Self {
            config: config.clone(),
            campaigns: Arc::new(SqliteCampaignRepository::new(pool.clone())),
            triggers: Arc::new(SqliteTriggerConfigRepository::new(pool.clone())),
            activity_log: Arc::new(SqliteActivityLog::new(pool.clone())),
            ab_tests: Arc::new(SqliteAbTestRepository::new(pool.clone())),
            clock: Arc::new(SystemClock),
            pool,
        })
    }

    pub fn lifecycle_controller(&self) -> LifecycleController {
        let composer = PostComposer::new(
            Arc::new(StaticTemplateProvider::default()),
            self.config.engine.post_lead_time(),
            self.config.engine.content_seed,
        );
        LifecycleController::new(
            self.campaigns.clone(),
            self.triggers.clone(),
            self.activity_log.clone(),
            composer,
            self.clock.clone(),
        )
        .with_tick_budget(self.config.engine.tick_budget())
    }

    pub fn ab_test_service(&self) -> AbTestService {
        AbTestService::new(self.ab_tests.clone(), self.clock.clone())
    }
}
