//! Deterministic insights, recommendations, and test planning aids.
//!
//! Everything here is a pure function of the tests passed in.

use std::cmp::Reverse;

use crate::domain::models::{
    AbTest, Impact, Insight, InsightKind, Priority, Recommendation, RecommendationAction,
    TestSuggestion, TestTemplate, TestType, VariantSlot,
};
use crate::services::metrics::test_significance;

/// CTR gap, in percentage points, above which a performance insight is emitted.
pub const CTR_GAP_PP: f64 = 1.0;
/// Conversion-rate gap, in percentage points.
pub const CONVERSION_GAP_PP: f64 = 2.0;
/// Cost-per-conversion gap, in currency units.
pub const COST_GAP: f64 = 5.0;
/// Significance at which results are conclusive.
pub const CONCLUSIVE_SIGNIFICANCE: f64 = 95.0;
/// Significance at which results show a trend worth extending.
pub const TREND_SIGNIFICANCE: f64 = 80.0;

/// Industry tag shared by templates that apply everywhere.
pub const GENERAL_INDUSTRY: &str = "general";

/// Findings for a test, ranked by impact and then confidence.
pub fn generate_insights(test: &AbTest) -> Vec<Insight> {
    let a = &test.variant_a.metrics;
    let b = &test.variant_b.metrics;
    let mut insights = Vec::new();

    let ctr_gap = (a.ctr - b.ctr).abs();
    if ctr_gap > CTR_GAP_PP {
        let better = if a.ctr > b.ctr {
            VariantSlot::VariantA
        } else {
            VariantSlot::VariantB
        };
        insights.push(Insight {
            kind: InsightKind::Performance,
            title: format!("Variant {} has {ctr_gap:.1}% better CTR", better.letter()),
            description: format!(
                "This suggests the {} resonates better with your audience",
                test.variant(better).name
            ),
            impact: Impact::Medium,
            confidence: 85,
        });
    }

    let conversion_gap = (a.conversion_rate - b.conversion_rate).abs();
    if conversion_gap > CONVERSION_GAP_PP {
        let better = if a.conversion_rate > b.conversion_rate {
            VariantSlot::VariantA
        } else {
            VariantSlot::VariantB
        };
        insights.push(Insight {
            kind: InsightKind::Conversion,
            title: format!(
                "Variant {} converts {conversion_gap:.1}% better",
                better.letter()
            ),
            description: "Higher conversion rates indicate better alignment with user intent"
                .to_string(),
            impact: Impact::High,
            confidence: 92,
        });
    }

    let cost_a = a.cost_per_conversion();
    let cost_b = b.cost_per_conversion();
    let cost_gap = (cost_a - cost_b).abs();
    if cost_gap > COST_GAP {
        let cheaper = if cost_a < cost_b {
            VariantSlot::VariantA
        } else {
            VariantSlot::VariantB
        };
        insights.push(Insight {
            kind: InsightKind::Cost,
            title: format!(
                "Variant {} is ${cost_gap:.2} cheaper per conversion",
                cheaper.letter()
            ),
            description:
                "Better cost efficiency allows for more budget allocation to successful variants"
                    .to_string(),
            impact: Impact::High,
            confidence: 88,
        });
    }

    match test_significance(test) {
        Some(significance) if significance >= CONCLUSIVE_SIGNIFICANCE => {
            insights.push(Insight {
                kind: InsightKind::Statistical,
                title: format!("Results are statistically significant ({significance}%)"),
                description: "You can confidently implement the winning variant".to_string(),
                impact: Impact::High,
                confidence: 99,
            });
        }
        Some(significance) if significance >= TREND_SIGNIFICANCE => {
            insights.push(Insight {
                kind: InsightKind::Statistical,
                title: format!("Results show strong trend ({significance}%)"),
                description: "Consider running the test longer for conclusive results"
                    .to_string(),
                impact: Impact::Medium,
                confidence: 75,
            });
        }
        _ => {}
    }

    // Stable sort keeps emission order among equals.
    insights.sort_by_key(|insight| (Reverse(insight.impact), Reverse(insight.confidence)));
    insights
}

/// Follow-up actions for a test.
pub fn generate_recommendations(test: &AbTest) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if let Some(winner) = test.winner {
        recommendations.push(Recommendation {
            action: RecommendationAction::ImplementWinner,
            title: format!(
                "Implement {} across all campaigns",
                test.variant(winner).name
            ),
            description: "Apply the winning variant's elements to similar campaigns".to_string(),
            priority: Priority::High,
            expected_impact: "Increase overall campaign performance by 15-25%".to_string(),
        });
    }

    if test.test_type == TestType::Content {
        recommendations.push(Recommendation {
            action: RecommendationAction::TestDesign,
            title: "Test visual design elements next".to_string(),
            description: "Now that content is optimized, test button colors, images, or layout"
                .to_string(),
            priority: Priority::Medium,
            expected_impact: "Additional 10-15% improvement possible".to_string(),
        });
    }

    if test.platforms.len() > 1 {
        recommendations.push(Recommendation {
            action: RecommendationAction::PlatformAnalysis,
            title: "Analyze platform-specific performance".to_string(),
            description: "Different platforms may respond differently to variants".to_string(),
            priority: Priority::Medium,
            expected_impact: "Platform-optimized content for better ROI".to_string(),
        });
    }

    recommendations
}

#[allow(clippy::too_many_arguments)]
fn template(
    template_id: &str,
    name: &str,
    description: &str,
    test_type: TestType,
    industry: &str,
    elements: &[&str],
    duration_days: u32,
    min_traffic: u64,
) -> TestTemplate {
    TestTemplate {
        template_id: template_id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        test_type,
        industry: industry.to_string(),
        elements: elements.iter().map(|e| (*e).to_string()).collect(),
        duration_days,
        min_traffic,
    }
}

/// Built-in templates. With an industry, only that industry's templates
/// and the general ones are returned.
pub fn test_templates(industry: Option<&str>) -> Vec<TestTemplate> {
    let templates = vec![
        template(
            "headline_test",
            "Headline A/B Test",
            "Test different headline approaches",
            TestType::Content,
            GENERAL_INDUSTRY,
            &["headline", "subheadline"],
            7,
            1000,
        ),
        template(
            "cta_test",
            "Call-to-Action Test",
            "Test different CTA text and colors",
            TestType::Design,
            GENERAL_INDUSTRY,
            &["cta_text", "cta_color", "cta_size"],
            5,
            500,
        ),
        template(
            "image_test",
            "Visual Content Test",
            "Test different images or video content",
            TestType::Creative,
            GENERAL_INDUSTRY,
            &["main_image", "background", "video"],
            10,
            2000,
        ),
        template(
            "wellness_service_test",
            "Wellness Service Positioning",
            "Test different service presentation approaches",
            TestType::Content,
            "wellness",
            &["benefits", "social_proof", "pricing"],
            14,
            1500,
        ),
    ];

    match industry {
        Some(industry) => templates
            .into_iter()
            .filter(|t| t.industry == industry || t.industry == GENERAL_INDUSTRY)
            .collect(),
        None => templates,
    }
}

/// Suggest test types a campaign has not tried yet.
pub fn suggest_next_tests(previous: &[AbTest]) -> Vec<TestSuggestion> {
    let tried = |test_type: TestType| previous.iter().any(|t| t.test_type == test_type);
    let mut suggestions = Vec::new();

    if !tried(TestType::Content) {
        suggestions.push(TestSuggestion {
            test_type: TestType::Content,
            title: "Test Headline Variations".to_string(),
            description: "Test emotional vs. rational headline approaches".to_string(),
            expected_lift: "15-30%".to_string(),
            priority: Priority::High,
        });
    }
    if !tried(TestType::Design) {
        suggestions.push(TestSuggestion {
            test_type: TestType::Design,
            title: "Test CTA Button Design".to_string(),
            description: "Test different colors, sizes, and positioning".to_string(),
            expected_lift: "10-20%".to_string(),
            priority: Priority::Medium,
        });
    }
    if !tried(TestType::Creative) {
        suggestions.push(TestSuggestion {
            test_type: TestType::Creative,
            title: "Test Visual Content".to_string(),
            description: "Test images vs. videos vs. carousels".to_string(),
            expected_lift: "20-40%".to_string(),
            priority: Priority::High,
        });
    }

    suggestions
}
