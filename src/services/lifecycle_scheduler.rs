//! Recurring lifecycle scheduler.
//!
//! Drives [`LifecycleController::run_tick`] on a fixed interval until
//! stopped. Stopping cancels the timer but lets an in-flight tick finish.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::domain::errors::DomainResult;
use crate::services::lifecycle_controller::{LifecycleController, TickReport};

/// Configuration for the lifecycle scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between ticks.
    pub check_interval: Duration,
    /// Whether to tick immediately on start.
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            run_on_startup: true,
        }
    }
}

impl SchedulerConfig {
    pub fn with_interval(check_interval: Duration) -> Self {
        Self {
            check_interval,
            ..Default::default()
        }
    }
}

/// Counters describing the scheduler's history.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStatus {
    pub running: bool,
    pub total_ticks: u64,
    pub successful_ticks: u64,
    pub failed_ticks: u64,
    pub overruns: u64,
    pub total_actions: u64,
    pub last_tick: Option<Instant>,
}

pub struct LifecycleScheduler {
    controller: Arc<LifecycleController>,
    config: SchedulerConfig,
    status: Arc<RwLock<SchedulerStatus>>,
    started: AtomicBool,
    shutdown: watch::Sender<bool>,
    task: StdMutex<Option<JoinHandle<()>>>,
}

impl LifecycleScheduler {
    pub fn new(controller: Arc<LifecycleController>, config: SchedulerConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            controller,
            config,
            status: Arc::new(RwLock::new(SchedulerStatus::default())),
            started: AtomicBool::new(false),
            shutdown,
            task: StdMutex::new(None),
        }
    }

    pub fn with_defaults(controller: Arc<LifecycleController>) -> Self {
        Self::new(controller, SchedulerConfig::default())
    }

    /// Start ticking in the background. Returns `false` if the scheduler was
    /// already started; a stopped scheduler cannot be restarted.
    pub fn start(&self) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            return false;
        }

        let controller = Arc::clone(&self.controller);
        let status = Arc::clone(&self.status);
        let config = self.config.clone();
        let shutdown = self.shutdown.subscribe();

        let handle = tokio::spawn(run_loop(controller, status, config, shutdown));
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        info!(
            interval_secs = self.config.check_interval.as_secs(),
            "lifecycle scheduler started"
        );
        true
    }

    /// Stop the scheduler and wait for the loop to exit. A tick already in
    /// progress runs to completion. Calling this more than once is a no-op,
    /// and a scheduler stopped before it was started never starts.
    pub async fn stop(&self) {
        self.started.store(true, Ordering::Release);
        // send_replace never fails, even with no receivers left
        self.shutdown.send_replace(true);

        let handle = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "lifecycle scheduler task ended abnormally");
            }
            info!("lifecycle scheduler stopped");
        }
    }

    pub fn is_stop_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Run one tick now, outside the timer. Serialized with timer ticks.
    pub async fn run_once(&self) -> DomainResult<TickReport> {
        self.controller.run_tick().await
    }

    pub async fn status(&self) -> SchedulerStatus {
        self.status.read().await.clone()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

async fn run_loop(
    controller: Arc<LifecycleController>,
    status: Arc<RwLock<SchedulerStatus>>,
    config: SchedulerConfig,
    mut shutdown: watch::Receiver<bool>,
) {
    status.write().await.running = true;

    let mut timer = interval(config.check_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    if !config.run_on_startup {
        // The first tick of an interval completes immediately.
        timer.tick().await;
    }

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = timer.tick() => {
                run_tick(&controller, &status).await;
            }
        }
    }

    status.write().await.running = false;
}

async fn run_tick(controller: &LifecycleController, status: &RwLock<SchedulerStatus>) {
    let result = controller.run_tick().await;

    let mut status = status.write().await;
    status.total_ticks += 1;
    status.last_tick = Some(Instant::now());
    match result {
        Ok(report) => {
            status.successful_ticks += 1;
            status.total_actions += report.actions.len() as u64;
            if report.overran {
                status.overruns += 1;
            }
        }
        Err(e) => {
            status.failed_ticks += 1;
            warn!(error = %e, "lifecycle tick failed");
        }
    }
}
