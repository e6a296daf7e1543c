//! Implementation of the `autopilot run` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::cli::commands::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::services::{LifecycleScheduler, SchedulerConfig, TickReport};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the tick interval in seconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Run a single tick and exit
    #[arg(long)]
    pub once: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct TickOutput {
    pub actions: usize,
    pub evaluated: usize,
    pub skipped_unconfigured: usize,
    pub failed: usize,
    pub deferred: usize,
    pub duration_ms: u64,
    pub overran: bool,
}

impl From<&TickReport> for TickOutput {
    fn from(report: &TickReport) -> Self {
        Self {
            actions: report.actions.len(),
            evaluated: report.evaluated,
            skipped_unconfigured: report.skipped_unconfigured,
            failed: report.failed,
            deferred: report.deferred,
            duration_ms: report.duration.as_millis() as u64,
            overran: report.overran,
        }
    }
}

impl CommandOutput for TickOutput {
    fn to_human(&self) -> String {
        let mut line = format!(
            "Tick complete: {} action(s), {} evaluated, {} skipped, {} failed in {}ms",
            self.actions, self.evaluated, self.skipped_unconfigured, self.failed, self.duration_ms
        );
        if self.deferred > 0 {
            line.push_str(&format!(", {} deferred", self.deferred));
        }
        line
    }
}

#[derive(Debug, serde::Serialize)]
pub struct RunOutput {
    pub total_ticks: u64,
    pub successful_ticks: u64,
    pub failed_ticks: u64,
    pub overruns: u64,
    pub total_actions: u64,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        format!(
            "Scheduler stopped after {} tick(s) ({} failed, {} overran), {} action(s) taken",
            self.total_ticks, self.failed_ticks, self.overruns, self.total_actions
        )
    }
}

pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;
    let controller = Arc::new(ctx.lifecycle_controller());

    if args.once {
        let report = controller.run_tick().await?;
        output(&TickOutput::from(&report), json_mode);
        return Ok(());
    }

    let scheduler_config = SchedulerConfig {
        check_interval: args
            .interval
            .map_or_else(|| config.engine.check_interval(), std::time::Duration::from_secs),
        run_on_startup: config.engine.run_on_startup,
    };
    if scheduler_config.check_interval.is_zero() {
        anyhow::bail!("--interval must be at least 1 second");
    }

    let scheduler = LifecycleScheduler::new(controller, scheduler_config);
    scheduler.start();

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("shutdown requested");
    scheduler.stop().await;

    let status = scheduler.status().await;
    let out = RunOutput {
        total_ticks: status.total_ticks,
        successful_ticks: status.successful_ticks,
        failed_ticks: status.failed_ticks,
        overruns: status.overruns,
        total_actions: status.total_actions,
    };
    output(&out, json_mode);
    Ok(())
}
