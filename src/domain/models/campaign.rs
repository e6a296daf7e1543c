//! Campaign and post domain models.
//!
//! A campaign is a set of scheduled social posts for one persona. Its
//! lifecycle status is driven by the autonomous lifecycle controller once the
//! campaign goes live.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a campaign.
///
/// Only `Live` campaigns are evaluated by the lifecycle controller. Every
/// automated action moves the campaign out of `Live`, which is what makes
/// repeated ticks idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    #[default]
    Draft,
    Live,
    /// Extended with additional posts in the winning format.
    Extended,
    /// Switched to a different post format after mediocre engagement.
    Pivoted,
    /// Retired after falling below the failure threshold.
    Archived,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Live => "live",
            Self::Extended => "extended",
            Self::Pivoted => "pivoted",
            Self::Archived => "archived",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "live" => Some(Self::Live),
            "extended" => Some(Self::Extended),
            "pivoted" => Some(Self::Pivoted),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    /// Returns true if the lifecycle controller may act on this campaign.
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

/// Format of a social post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostFormat {
    #[default]
    Reels,
    Story,
    Post,
}

impl PostFormat {
    /// All formats in pivot preference order.
    pub const ALL: [PostFormat; 3] = [Self::Reels, Self::Story, Self::Post];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reels => "reels",
            Self::Story => "story",
            Self::Post => "post",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "reels" | "reel" => Some(Self::Reels),
            "story" | "stories" => Some(Self::Story),
            "post" => Some(Self::Post),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Scheduled,
    Published,
}

/// A single post belonging to a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    /// Back-reference to the owning campaign.
    pub campaign_id: String,
    #[serde(default)]
    pub format: PostFormat,
    pub content: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    pub scheduled_for: DateTime<Utc>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub auto_generated: bool,
    /// Campaign whose performance triggered this post, for synthesized posts.
    #[serde(default)]
    pub extension_source: Option<String>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Engagement counted by the winning-format selector.
    pub fn engagement(&self) -> u64 {
        self.likes + self.comments
    }
}

/// Aggregate analytics for a campaign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignAnalytics {
    #[serde(default)]
    pub reach: u64,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
}

impl CampaignAnalytics {
    pub fn total_engagement(&self) -> u64 {
        self.likes + self.comments + self.shares
    }
}

/// Platforms used for synthesized posts when a campaign has none configured.
pub const DEFAULT_PLATFORMS: &[&str] = &["instagram"];

/// A marketing campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub persona: String,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub posts: Vec<Post>,
    /// Missing analytics are treated as zero engagement.
    #[serde(default)]
    pub analytics: Option<CampaignAnalytics>,
    #[serde(default)]
    pub extensions: u32,
    #[serde(default)]
    pub last_extension: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_pivot: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Create a new draft campaign.
    pub fn new(id: impl Into<String>, persona: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: String::new(),
            persona: persona.into(),
            status: CampaignStatus::Draft,
            platforms: Vec::new(),
            posts: Vec::new(),
            analytics: None,
            extensions: 0,
            last_extension: None,
            last_pivot: None,
            archived_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_status(mut self, status: CampaignStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_analytics(mut self, analytics: CampaignAnalytics) -> Self {
        self.analytics = Some(analytics);
        self
    }

    pub fn with_platforms(mut self, platforms: Vec<String>) -> Self {
        self.platforms = platforms;
        self
    }

    pub fn with_posts(mut self, posts: Vec<Post>) -> Self {
        self.posts = posts;
        self
    }

    /// Platforms synthesized posts are scheduled on.
    pub fn target_platforms(&self) -> Vec<String> {
        if self.platforms.is_empty() {
            DEFAULT_PLATFORMS.iter().map(|p| (*p).to_string()).collect()
        } else {
            self.platforms.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip_str() {
        for status in [
            CampaignStatus::Draft,
            CampaignStatus::Live,
            CampaignStatus::Extended,
            CampaignStatus::Pivoted,
            CampaignStatus::Archived,
        ] {
            assert_eq!(CampaignStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(CampaignStatus::from_str("LIVE"), Some(CampaignStatus::Live));
        assert_eq!(CampaignStatus::from_str("unknown"), None);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(PostFormat::from_str("reels"), Some(PostFormat::Reels));
        assert_eq!(PostFormat::from_str("Story"), Some(PostFormat::Story));
        assert_eq!(PostFormat::from_str("carousel"), None);
    }

    #[test]
    fn test_target_platforms_default() {
        let campaign = Campaign::new("c1", "medspa");
        assert_eq!(campaign.target_platforms(), vec!["instagram".to_string()]);

        let campaign = campaign.with_platforms(vec!["tiktok".into(), "facebook".into()]);
        assert_eq!(campaign.target_platforms().len(), 2);
    }

    #[test]
    fn test_deserialize_minimal_campaign() {
        let json = r#"{
            "id": "cmp_1",
            "persona": "speaker",
            "status": "live",
            "created_at": "2025-01-20T10:00:00Z",
            "updated_at": "2025-01-20T10:00:00Z"
        }"#;
        let campaign: Campaign = serde_json::from_str(json).unwrap();
        assert_eq!(campaign.status, CampaignStatus::Live);
        assert!(campaign.analytics.is_none());
        assert!(campaign.posts.is_empty());
        assert_eq!(campaign.extensions, 0);
    }
}
