//! Derived, human-readable findings about A/B tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ab_test::TestType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Performance,
    Conversion,
    Cost,
    Statistical,
}

/// Expected business impact. Ordered so that `High` ranks first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Impact {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    /// How much to trust the insight, in percent.
    pub confidence: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationAction {
    ImplementWinner,
    TestDesign,
    PlatformAnalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: RecommendationAction,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub expected_impact: String,
}

/// Insights and follow-up recommendations for one test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestInsights {
    pub test_id: Uuid,
    pub significance: Option<f64>,
    pub insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
    pub generated_at: DateTime<Utc>,
}

/// A reusable starting point for a new test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTemplate {
    pub template_id: String,
    pub name: String,
    pub description: String,
    pub test_type: TestType,
    pub industry: String,
    pub elements: Vec<String>,
    pub duration_days: u32,
    pub min_traffic: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuggestion {
    pub test_type: TestType,
    pub title: String,
    pub description: String,
    pub expected_lift: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextTestSuggestions {
    pub campaign_id: String,
    pub suggestions: Vec<TestSuggestion>,
    pub generated_at: DateTime<Utc>,
}
