//! Activity log records of automated lifecycle actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::campaign::PostFormat;

pub const REASON_EXTENSION: &str = "Performance exceeds benchmarks";
pub const REASON_PIVOT: &str = "Format optimization attempt";
pub const REASON_ARCHIVE: &str = "Underperforming - below failure threshold";

/// Kind of automated action taken on a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Extension,
    Pivot,
    Archive,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extension => "extension",
            Self::Pivot => "pivot",
            Self::Archive => "archive",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "extension" | "extend" => Some(Self::Extension),
            "pivot" => Some(Self::Pivot),
            "archive" => Some(Self::Archive),
            _ => None,
        }
    }
}

/// Action payload, tagged by `type` when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LifecycleAction {
    Extension {
        new_posts_count: u32,
        winning_format: PostFormat,
    },
    Pivot {
        from_format: PostFormat,
        to_format: PostFormat,
    },
    Archive,
}

impl LifecycleAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Extension { .. } => ActionKind::Extension,
            Self::Pivot { .. } => ActionKind::Pivot,
            Self::Archive => ActionKind::Archive,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::Extension { .. } => REASON_EXTENSION,
            Self::Pivot { .. } => REASON_PIVOT,
            Self::Archive => REASON_ARCHIVE,
        }
    }
}

/// One append-only entry in the activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: Uuid,
    pub campaign_id: String,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
    /// Engagement rate observed when the decision was made.
    pub engagement_rate: f64,
    #[serde(flatten)]
    pub action: LifecycleAction,
}

impl ActivityLogEntry {
    pub fn new(
        campaign_id: impl Into<String>,
        action: LifecycleAction,
        engagement_rate: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            campaign_id: campaign_id.into(),
            timestamp,
            reason: action.reason().to_string(),
            engagement_rate,
            action,
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }
}
