//! Synthesis of extension and pivot posts.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Campaign, Post, PostFormat, PostStatus, MAX_EXTENSION_POSTS};
use crate::domain::ports::ContentProvider;

/// Builds scheduled posts from the content provider's candidates.
///
/// Candidate selection uses a seedable RNG so that runs with a fixed seed
/// produce the same copy.
pub struct PostComposer {
    provider: Arc<dyn ContentProvider>,
    rng: Mutex<StdRng>,
    lead_time: Duration,
}

impl PostComposer {
    pub fn new(provider: Arc<dyn ContentProvider>, lead_time: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            provider,
            rng: Mutex::new(rng),
            lead_time,
        }
    }

    /// Compose `count` posts in `format` for `campaign`.
    ///
    /// The first post is scheduled `lead_time` after `now`; each following
    /// post is `spacing` after the previous one. A count above
    /// [`MAX_EXTENSION_POSTS`] or a schedule past the representable date
    /// range is rejected before anything is built.
    pub async fn compose(
        &self,
        campaign: &Campaign,
        format: PostFormat,
        count: u32,
        spacing: Duration,
        now: DateTime<Utc>,
    ) -> DomainResult<Vec<Post>> {
        if count > MAX_EXTENSION_POSTS {
            return Err(DomainError::ValidationFailed(format!(
                "cannot compose {count} posts, the limit is {MAX_EXTENSION_POSTS}"
            )));
        }
        let schedule = schedule_times(now, self.lead_time, spacing, count)?;

        let candidates = self.provider.templates_for(format).await?;
        if candidates.is_empty() {
            return Err(DomainError::ContentUnavailable(format.to_string()));
        }

        let platforms = campaign.target_platforms();
        let mut posts = Vec::with_capacity(schedule.len());
        for scheduled_for in schedule {
            let content = candidates[self.pick(candidates.len())].clone();
            posts.push(Post {
                id: format!("ext_{}_{}", campaign.id, Uuid::new_v4().simple()),
                campaign_id: campaign.id.clone(),
                format,
                content,
                platforms: platforms.clone(),
                scheduled_for,
                status: PostStatus::Scheduled,
                auto_generated: true,
                extension_source: Some(campaign.id.clone()),
                likes: 0,
                comments: 0,
                created_at: now,
            });
        }
        Ok(posts)
    }

    fn pick(&self, len: usize) -> usize {
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        rng.gen_range(0..len)
    }
}

/// Send times for `count` posts: `lead_time` after `now`, then every `spacing`.
fn schedule_times(
    now: DateTime<Utc>,
    lead_time: Duration,
    spacing: Duration,
    count: u32,
) -> DomainResult<Vec<DateTime<Utc>>> {
    let first = now.checked_add_signed(lead_time);
    (0..count)
        .map(|i| {
            i32::try_from(i)
                .ok()
                .and_then(|i| spacing.checked_mul(i))
                .zip(first)
                .and_then(|(offset, first)| first.checked_add_signed(offset))
                .ok_or_else(|| {
                    DomainError::ValidationFailed(format!(
                        "post {} cannot be scheduled: time is out of range",
                        i + 1
                    ))
                })
        })
        .collect()
}
