//! A/B test manager.
//!
//! Owns the test state machine, folds metric pushes into variant counters, and
//! auto-concludes active tests once their target confidence is reached.
//! Every read-modify-write on a test holds that test's lock, so concurrent
//! metric pushes for one test are applied one at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    AbTest, AbTestStatus, AbTestUpdate, MetricsUpdate, NewAbTest, NewVariant,
    NextTestSuggestions, TestInsights, TestTemplate, Variant, VariantSlot, DEFAULT_PLATFORMS,
};
use crate::domain::ports::{AbTestRepository, Clock};
use crate::services::insight_generator::{
    generate_insights, generate_recommendations, suggest_next_tests, test_templates,
};
use crate::services::metrics::{apply_update, test_significance};

pub const DEFAULT_TEST_NAME: &str = "Untitled A/B Test";
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 95.0;
pub const DEFAULT_TRAFFIC_SPLIT: u8 = 50;
pub const DEFAULT_DURATION_DAYS: u32 = 7;

type LockMap = StdMutex<HashMap<Uuid, Arc<Mutex<()>>>>;

/// Holds one test's lock. On release the map entry is dropped once no other
/// caller holds or waits on it, so the map only tracks tests in use.
struct TestGuard<'a> {
    locks: &'a LockMap,
    test_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for TestGuard<'_> {
    fn drop(&mut self) {
        // Entries are only cloned under the map lock, so a count of one
        // means nobody else holds or awaits this mutex.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        self.guard.take();
        if locks
            .get(&self.test_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.test_id);
        }
    }
}

pub struct AbTestService {
    repository: Arc<dyn AbTestRepository>,
    clock: Arc<dyn Clock>,
    locks: LockMap,
}

impl AbTestService {
    pub fn new(repository: Arc<dyn AbTestRepository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            locks: StdMutex::new(HashMap::new()),
        }
    }

    async fn lock(&self, test_id: Uuid) -> TestGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(test_id).or_default())
        };
        TestGuard {
            locks: &self.locks,
            test_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    async fn load(&self, test_id: Uuid) -> DomainResult<AbTest> {
        self.repository
            .get(test_id)
            .await?
            .ok_or(DomainError::AbTestNotFound(test_id))
    }

    /// Create a draft test. Input is fully validated before anything is
    /// persisted.
    #[instrument(skip(self, input), fields(campaign_id = %input.campaign_id))]
    pub async fn create_test(&self, input: NewAbTest) -> DomainResult<AbTest> {
        if input.campaign_id.trim().is_empty() {
            return Err(DomainError::ValidationFailed(
                "campaign_id is required".to_string(),
            ));
        }
        let variant_a = validate_variant("variant_a", input.variant_a)?;
        let variant_b = validate_variant("variant_b", input.variant_b)?;

        let confidence_level = input.confidence_level.unwrap_or(DEFAULT_CONFIDENCE_LEVEL);
        validate_confidence_level(confidence_level)?;
        let traffic_split = input.traffic_split.unwrap_or(DEFAULT_TRAFFIC_SPLIT);
        validate_traffic_split(traffic_split)?;
        let duration_days = input.duration_days.unwrap_or(DEFAULT_DURATION_DAYS);
        validate_duration(duration_days)?;

        let now = self.clock.now();
        let test = AbTest {
            id: Uuid::new_v4(),
            campaign_id: input.campaign_id,
            name: input
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TEST_NAME.to_string()),
            status: AbTestStatus::Draft,
            start_date: input.start_date,
            end_date: input.end_date,
            duration_days,
            confidence_level,
            traffic_split,
            variant_a: build_variant(variant_a, "Variant A"),
            variant_b: build_variant(variant_b, "Variant B"),
            hypothesis: input.hypothesis.unwrap_or_default(),
            test_type: input.test_type.unwrap_or_default(),
            platforms: input
                .platforms
                .filter(|platforms| !platforms.is_empty())
                .unwrap_or_else(|| DEFAULT_PLATFORMS.iter().map(|p| (*p).to_string()).collect()),
            winner: None,
            significance: None,
            created_at: now,
            updated_at: now,
        };

        self.repository.create(&test).await?;
        info!(test_id = %test.id, "A/B test created");
        Ok(test)
    }

    /// All tests, oldest first.
    pub async fn get_all_tests(&self) -> DomainResult<Vec<AbTest>> {
        self.repository.list().await
    }

    pub async fn get_test_by_id(&self, test_id: Uuid) -> DomainResult<Option<AbTest>> {
        self.repository.get(test_id).await
    }

    pub async fn get_tests_by_campaign(&self, campaign_id: &str) -> DomainResult<Vec<AbTest>> {
        self.repository.list_by_campaign(campaign_id).await
    }

    /// Edit descriptive fields. Status, winner, variants, and metrics only
    /// change through the lifecycle and metrics operations.
    pub async fn update_test(&self, test_id: Uuid, update: AbTestUpdate) -> DomainResult<AbTest> {
        let _guard = self.lock(test_id).await;
        let mut test = self.load(test_id).await?;

        if let Some(name) = update.name {
            test.name = name;
        }
        if let Some(hypothesis) = update.hypothesis {
            test.hypothesis = hypothesis;
        }
        if let Some(level) = update.confidence_level {
            validate_confidence_level(level)?;
            test.confidence_level = level;
        }
        if let Some(split) = update.traffic_split {
            validate_traffic_split(split)?;
            test.traffic_split = split;
        }
        if let Some(end_date) = update.end_date {
            test.end_date = Some(end_date);
        }
        if let Some(days) = update.duration_days {
            validate_duration(days)?;
            test.duration_days = days;
        }
        if let Some(platforms) = update.platforms {
            test.platforms = platforms;
        }
        if let Some(test_type) = update.test_type {
            test.test_type = test_type;
        }
        test.updated_at = self.clock.now();

        self.repository.update(&test).await?;
        Ok(test)
    }

    /// Delete a test, returning what was deleted.
    pub async fn delete_test(&self, test_id: Uuid) -> DomainResult<AbTest> {
        let _guard = self.lock(test_id).await;
        let test = self.load(test_id).await?;
        self.repository.delete(test_id).await?;

        info!(test_id = %test_id, "A/B test deleted");
        Ok(test)
    }

    pub async fn start_test(&self, test_id: Uuid) -> DomainResult<AbTest> {
        let _guard = self.lock(test_id).await;
        let mut test = self.load(test_id).await?;
        if test.status != AbTestStatus::Draft {
            return Err(DomainError::InvalidState(
                "Can only start tests in draft status".to_string(),
            ));
        }

        let now = self.clock.now();
        test.status = AbTestStatus::Active;
        test.start_date = Some(now);
        test.updated_at = now;
        self.repository.update(&test).await?;

        info!(test_id = %test_id, "A/B test started");
        Ok(test)
    }

    pub async fn pause_test(&self, test_id: Uuid) -> DomainResult<AbTest> {
        let _guard = self.lock(test_id).await;
        let mut test = self.load(test_id).await?;
        if test.status != AbTestStatus::Active {
            return Err(DomainError::InvalidState(
                "Can only pause tests in active status".to_string(),
            ));
        }

        test.status = AbTestStatus::Paused;
        test.updated_at = self.clock.now();
        self.repository.update(&test).await?;

        info!(test_id = %test_id, "A/B test paused");
        Ok(test)
    }

    pub async fn resume_test(&self, test_id: Uuid) -> DomainResult<AbTest> {
        let _guard = self.lock(test_id).await;
        let mut test = self.load(test_id).await?;
        if test.status != AbTestStatus::Paused {
            return Err(DomainError::InvalidState(
                "Can only resume tests in paused status".to_string(),
            ));
        }

        test.status = AbTestStatus::Active;
        test.updated_at = self.clock.now();
        self.repository.update(&test).await?;

        info!(test_id = %test_id, "A/B test resumed");
        Ok(test)
    }

    /// Complete a test. With a winner, the current significance is stored
    /// alongside it.
    pub async fn stop_test(
        &self,
        test_id: Uuid,
        winner: Option<VariantSlot>,
    ) -> DomainResult<AbTest> {
        let _guard = self.lock(test_id).await;
        let mut test = self.load(test_id).await?;
        self.conclude(&mut test, winner)?;
        self.repository.update(&test).await?;
        Ok(test)
    }

    fn conclude(&self, test: &mut AbTest, winner: Option<VariantSlot>) -> DomainResult<()> {
        if !test.status.can_transition_to(AbTestStatus::Completed) {
            return Err(DomainError::InvalidState(
                "Test is already completed".to_string(),
            ));
        }

        let now = self.clock.now();
        test.status = AbTestStatus::Completed;
        test.end_date = Some(now);
        test.updated_at = now;
        if let Some(winner) = winner {
            test.winner = Some(winner);
            test.significance = test_significance(test);
        }

        info!(
            test_id = %test.id,
            winner = winner.map(|w| w.as_str()),
            significance = test.significance,
            "A/B test completed"
        );
        Ok(())
    }

    /// Record cumulative counters for one variant, then auto-conclude the
    /// test if it is active and has reached its target confidence.
    #[instrument(skip(self, update))]
    pub async fn update_test_metrics(
        &self,
        test_id: Uuid,
        variant_id: Uuid,
        update: MetricsUpdate,
    ) -> DomainResult<AbTest> {
        let _guard = self.lock(test_id).await;
        let mut test = self.load(test_id).await?;
        let slot = test
            .slot_of(variant_id)
            .ok_or(DomainError::VariantNotFound(variant_id))?;

        let variant = test.variant_mut(slot);
        variant.metrics = apply_update(&variant.metrics, &update)?;
        test.updated_at = self.clock.now();

        if test.status == AbTestStatus::Active {
            if let Some(significance) = test_significance(&test) {
                debug!(significance, target = test.confidence_level, "significance checked");
                if significance >= test.confidence_level {
                    let winner = leading_variant(&test);
                    self.conclude(&mut test, Some(winner))?;
                }
            }
        }

        self.repository.update(&test).await?;
        Ok(test)
    }

    pub async fn generate_test_insights(&self, test_id: Uuid) -> DomainResult<TestInsights> {
        let test = self.load(test_id).await?;
        Ok(TestInsights {
            test_id,
            significance: test_significance(&test),
            insights: generate_insights(&test),
            recommendations: generate_recommendations(&test),
            generated_at: self.clock.now(),
        })
    }

    pub fn get_test_templates(&self, industry: Option<&str>) -> Vec<TestTemplate> {
        test_templates(industry)
    }

    /// Suggest test types the campaign has not run yet.
    pub async fn suggest_next_test(&self, campaign_id: &str) -> DomainResult<NextTestSuggestions> {
        let previous = self.repository.list_by_campaign(campaign_id).await?;
        Ok(NextTestSuggestions {
            campaign_id: campaign_id.to_string(),
            suggestions: suggest_next_tests(&previous),
            generated_at: self.clock.now(),
        })
    }
}

/// Variant with the higher conversion rate. Ties go to variant B.
fn leading_variant(test: &AbTest) -> VariantSlot {
    if test.variant_a.metrics.conversion_rate > test.variant_b.metrics.conversion_rate {
        VariantSlot::VariantA
    } else {
        VariantSlot::VariantB
    }
}

fn validate_variant(field: &str, variant: Option<NewVariant>) -> DomainResult<NewVariant> {
    let variant = variant
        .ok_or_else(|| DomainError::ValidationFailed(format!("{field} is required")))?;
    if variant.content.is_empty() {
        warn!(field, "rejected variant without content");
        return Err(DomainError::ValidationFailed(format!(
            "{field} must have a headline, description, or cta"
        )));
    }
    Ok(variant)
}

fn build_variant(input: NewVariant, default_name: &str) -> Variant {
    let name = input
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| default_name.to_string());
    Variant::new(name, input.content)
}

fn validate_confidence_level(level: f64) -> DomainResult<()> {
    if level.is_finite() && level > 0.0 && level < 100.0 {
        Ok(())
    } else {
        Err(DomainError::ValidationFailed(format!(
            "confidence_level must be between 0 and 100, got {level}"
        )))
    }
}

fn validate_traffic_split(split: u8) -> DomainResult<()> {
    if (1..=99).contains(&split) {
        Ok(())
    } else {
        Err(DomainError::ValidationFailed(format!(
            "traffic_split must be between 1 and 99, got {split}"
        )))
    }
}

fn validate_duration(days: u32) -> DomainResult<()> {
    if days == 0 {
        return Err(DomainError::ValidationFailed(
            "duration_days must be at least 1".to_string(),
        ));
    }
    Ok(())
}
