//! Autonomous campaign lifecycle controller.
//!
//! Each tick inspects every live campaign against its persona's trigger
//! thresholds and takes at most one action on it:
//!
//! 1. engagement and reach velocity both clear the bar -> extend
//! 2. engagement below the failure threshold -> archive
//! 3. engagement between the failure threshold and the bar -> pivot
//! 4. anything else -> hold
//!
//! Every action moves the campaign out of `Live`, so a second tick over
//! unchanged data takes no further action.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::{
    ActivityLogEntry, Campaign, CampaignStatus, LifecycleAction, TriggerConfig,
};
use crate::domain::ports::{ActivityLog, CampaignRepository, Clock, TriggerConfigStore};
use crate::services::format_selector::{pivot_format, winning_format};
use crate::services::post_composer::PostComposer;

/// Default processing budget for one tick.
pub const DEFAULT_TICK_BUDGET: Duration = Duration::from_secs(30);

/// Engagement per unit of reach. Missing analytics count as no engagement.
pub fn engagement_rate(campaign: &Campaign) -> f64 {
    campaign.analytics.map_or(0.0, |analytics| {
        analytics.total_engagement() as f64 / analytics.reach.max(1) as f64
    })
}

/// Secondary eligibility signal for extension.
///
/// This is a proxy derived from engagement rate rather than a measured
/// growth rate; it is kept in one place so a real signal can replace it.
pub fn reach_velocity(engagement_rate: f64) -> f64 {
    1.0 + engagement_rate * 50.0
}

/// Outcome of evaluating one campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Extend,
    Pivot,
    Archive,
    Hold,
}

/// Apply the decision policy. First matching rule wins.
pub fn decide(engagement_rate: f64, reach_velocity: f64, config: &TriggerConfig) -> Decision {
    if engagement_rate >= config.min_engagement_rate && reach_velocity >= config.min_reach_velocity
    {
        Decision::Extend
    } else if engagement_rate < config.failure_threshold {
        Decision::Archive
    } else if engagement_rate < config.min_engagement_rate {
        Decision::Pivot
    } else {
        Decision::Hold
    }
}

/// Summary of one lifecycle tick.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    /// Actions taken, in campaign order.
    pub actions: Vec<ActivityLogEntry>,
    /// Live campaigns whose persona had thresholds.
    pub evaluated: usize,
    /// Live campaigns skipped because their persona has no thresholds.
    pub skipped_unconfigured: usize,
    /// Campaigns that could not be decoded or evaluated, left untouched.
    pub failed: usize,
    /// Live campaigns not reached before the tick budget ran out.
    pub deferred: usize,
    pub duration: Duration,
    pub overran: bool,
}

pub struct LifecycleController {
    campaigns: Arc<dyn CampaignRepository>,
    triggers: Arc<dyn TriggerConfigStore>,
    activity_log: Arc<dyn ActivityLog>,
    composer: PostComposer,
    clock: Arc<dyn Clock>,
    tick_budget: Duration,
    tick_lock: Mutex<()>,
}

impl LifecycleController {
    pub fn new(
        campaigns: Arc<dyn CampaignRepository>,
        triggers: Arc<dyn TriggerConfigStore>,
        activity_log: Arc<dyn ActivityLog>,
        composer: PostComposer,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            campaigns,
            triggers,
            activity_log,
            composer,
            clock,
            tick_budget: DEFAULT_TICK_BUDGET,
            tick_lock: Mutex::new(()),
        }
    }

    pub fn with_tick_budget(mut self, budget: Duration) -> Self {
        self.tick_budget = budget;
        self
    }

    pub fn tick_budget(&self) -> Duration {
        self.tick_budget
    }

    /// Run one evaluation pass and return the actions taken.
    pub async fn process_campaigns(&self) -> DomainResult<Vec<ActivityLogEntry>> {
        Ok(self.run_tick().await?.actions)
    }

    /// Run one evaluation pass and return the full tick report.
    ///
    /// Passes are serialized: a call made while another pass is running waits
    /// for it to finish. Failures decoding or evaluating one campaign are
    /// counted in `failed` and do not stop the pass; failures reading or
    /// saving the collection as a whole do.
    #[instrument(skip(self), name = "lifecycle_tick")]
    pub async fn run_tick(&self) -> DomainResult<TickReport> {
        let _guard = self.tick_lock.lock().await;
        let started = Instant::now();

        let batch = self.campaigns.load_batch().await?;
        let mut campaigns = batch.campaigns;
        // Thresholds are snapshotted so they cannot change mid-tick.
        let triggers: HashMap<String, TriggerConfig> = self
            .triggers
            .list()
            .await?
            .into_iter()
            .map(|config| (config.persona.clone(), config))
            .collect();

        let live: Vec<usize> = campaigns
            .iter()
            .enumerate()
            .filter(|(_, campaign)| campaign.status.is_live())
            .map(|(idx, _)| idx)
            .collect();

        let mut report = TickReport {
            failed: batch.unreadable.len(),
            ..TickReport::default()
        };

        for (position, &idx) in live.iter().enumerate() {
            if started.elapsed() >= self.tick_budget {
                report.deferred = live.len() - position;
                warn!(
                    deferred = report.deferred,
                    budget_ms = self.tick_budget.as_millis() as u64,
                    "tick budget exhausted, deferring remaining campaigns"
                );
                break;
            }

            let campaign = &campaigns[idx];
            let Some(config) = triggers.get(&campaign.persona) else {
                debug!(
                    campaign_id = %campaign.id,
                    persona = %campaign.persona,
                    "no trigger thresholds for persona, skipping"
                );
                report.skipped_unconfigured += 1;
                continue;
            };

            report.evaluated += 1;
            match self.evaluate(campaign, config).await {
                Ok(Some((updated, entry))) => {
                    info!(
                        campaign_id = %entry.campaign_id,
                        action = entry.kind().as_str(),
                        engagement_rate = entry.engagement_rate,
                        "lifecycle action taken"
                    );
                    campaigns[idx] = updated;
                    report.actions.push(entry);
                }
                Ok(None) => {}
                Err(e) => {
                    report.failed += 1;
                    error!(campaign_id = %campaign.id, error = %e, "failed to evaluate campaign");
                }
            }
        }

        if !report.actions.is_empty() {
            self.campaigns.save(&campaigns).await?;
            self.activity_log.append(&report.actions).await?;
        }

        report.duration = started.elapsed();
        report.overran = report.duration > self.tick_budget;
        if report.overran {
            warn!(
                duration_ms = report.duration.as_millis() as u64,
                budget_ms = self.tick_budget.as_millis() as u64,
                "lifecycle tick overran its budget"
            );
        }

        info!(
            actions = report.actions.len(),
            evaluated = report.evaluated,
            skipped = report.skipped_unconfigured,
            failed = report.failed,
            deferred = report.deferred,
            "lifecycle tick complete"
        );

        Ok(report)
    }

    /// Evaluate one live campaign, returning the mutated copy and its log
    /// entry when an action is taken. The input is never modified, so a
    /// failure leaves the stored campaign as it was.
    async fn evaluate(
        &self,
        campaign: &Campaign,
        config: &TriggerConfig,
    ) -> DomainResult<Option<(Campaign, ActivityLogEntry)>> {
        let now = self.clock.now();
        let rate = engagement_rate(campaign);
        let velocity = reach_velocity(rate);
        let decision = decide(rate, velocity, config);

        debug!(
            campaign_id = %campaign.id,
            engagement_rate = rate,
            reach_velocity = velocity,
            decision = ?decision,
            "campaign evaluated"
        );

        let mut updated = campaign.clone();
        let action = match decision {
            Decision::Hold => return Ok(None),
            Decision::Extend => {
                let format = winning_format(&campaign.posts);
                let spacing = chrono::Duration::hours(i64::from(config.max_post_spacing_hours));
                let posts = self
                    .composer
                    .compose(campaign, format, config.extension_post_count, spacing, now)
                    .await?;
                let new_posts_count = posts.len() as u32;

                updated.posts.extend(posts);
                updated.status = CampaignStatus::Extended;
                updated.extensions += 1;
                updated.last_extension = Some(now);

                LifecycleAction::Extension {
                    new_posts_count,
                    winning_format: format,
                }
            }
            Decision::Pivot => {
                let from_format = winning_format(&campaign.posts);
                let to_format = pivot_format(from_format);
                let posts = self
                    .composer
                    .compose(campaign, to_format, 1, chrono::Duration::zero(), now)
                    .await?;

                updated.posts.extend(posts);
                updated.status = CampaignStatus::Pivoted;
                updated.last_pivot = Some(now);

                LifecycleAction::Pivot {
                    from_format,
                    to_format,
                }
            }
            Decision::Archive => {
                updated.status = CampaignStatus::Archived;
                updated.archived_at = Some(now);
                LifecycleAction::Archive
            }
        };
        updated.updated_at = now;

        let entry = ActivityLogEntry::new(campaign.id.clone(), action, rate, now);
        Ok(Some((updated, entry)))
    }

    /// Most recent automated actions, newest first.
    pub async fn get_recent_actions(&self, limit: usize) -> DomainResult<Vec<ActivityLogEntry>> {
        self.activity_log.recent(limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::CampaignAnalytics;

    fn medspa() -> TriggerConfig {
        TriggerConfig::new("medspa", 0.025, 1.1, 0.015, 2)
    }

    #[test]
    fn test_engagement_rate() {
        let campaign = Campaign::new("c1", "medspa").with_analytics(CampaignAnalytics {
            reach: 2000,
            likes: 120,
            comments: 30,
            shares: 10,
        });
        assert!((engagement_rate(&campaign) - 0.08).abs() < 1e-12);
        assert!((reach_velocity(0.08) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_analytics_is_zero() {
        let campaign = Campaign::new("c1", "medspa");
        assert!(engagement_rate(&campaign).abs() < f64::EPSILON);
        assert_eq!(decide(0.0, reach_velocity(0.0), &medspa()), Decision::Archive);
    }

    #[test]
    fn test_zero_reach_uses_one() {
        let campaign = Campaign::new("c1", "medspa").with_analytics(CampaignAnalytics {
            reach: 0,
            likes: 3,
            comments: 0,
            shares: 0,
        });
        assert!((engagement_rate(&campaign) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decision_bands() {
        let config = medspa();
        assert_eq!(decide(0.08, 5.0, &config), Decision::Extend);
        assert_eq!(decide(0.025, reach_velocity(0.025), &config), Decision::Extend);
        assert_eq!(decide(0.02, reach_velocity(0.02), &config), Decision::Pivot);
        assert_eq!(decide(0.015, reach_velocity(0.015), &config), Decision::Pivot);
        assert_eq!(decide(0.0149, reach_velocity(0.0149), &config), Decision::Archive);
    }

    #[test]
    fn test_high_engagement_low_velocity_holds() {
        let config = TriggerConfig::new("x", 0.025, 10.0, 0.015, 1);
        // velocity 1 + 0.05 * 50 = 3.5 < 10
        assert_eq!(decide(0.05, reach_velocity(0.05), &config), Decision::Hold);
    }
}
