//! A/B test CLI commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use uuid::Uuid;

use crate::cli::commands::AppContext;
use crate::cli::id_resolver::resolve_ab_test_id;
use crate::cli::output::{list_table, output, render_list, truncate, ActionOutput, CommandOutput};
use crate::domain::models::{
    AbTest, Config, MetricsUpdate, NewAbTest, NewVariant, NextTestSuggestions, TestInsights,
    TestTemplate, TestType, Variant, VariantContent, VariantSlot,
};
use crate::services::metrics::test_significance;

#[derive(Args, Debug)]
pub struct AbTestArgs {
    #[command(subcommand)]
    pub command: AbTestCommands,
}

#[derive(Subcommand, Debug)]
pub enum AbTestCommands {
    /// Create a draft test from flags or a JSON file
    Create {
        /// JSON file describing the test; other flags are ignored when set
        #[arg(long)]
        file: Option<PathBuf>,

        /// Campaign the test belongs to
        #[arg(long, required_unless_present = "file")]
        campaign: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        hypothesis: Option<String>,

        /// content, design or creative
        #[arg(long)]
        test_type: Option<String>,

        /// Headline of variant A
        #[arg(long, required_unless_present = "file")]
        headline_a: Option<String>,

        /// Headline of variant B
        #[arg(long, required_unless_present = "file")]
        headline_b: Option<String>,

        #[arg(long)]
        cta_a: Option<String>,

        #[arg(long)]
        cta_b: Option<String>,

        /// Target confidence level in percent
        #[arg(long)]
        confidence: Option<f64>,

        /// Percentage of traffic sent to variant A
        #[arg(long)]
        split: Option<u8>,

        #[arg(long)]
        duration_days: Option<u32>,
    },

    /// List tests
    List {
        /// Only tests for this campaign
        #[arg(long)]
        campaign: Option<String>,
    },

    /// Show a test with both variants
    Show {
        /// Test ID or unique prefix
        id: String,
    },

    /// Start a draft test
    Start { id: String },

    /// Pause an active test
    Pause { id: String },

    /// Resume a paused test
    Resume { id: String },

    /// Complete a test, optionally declaring a winner
    Stop {
        id: String,

        /// a or b
        #[arg(long)]
        winner: Option<String>,
    },

    /// Record cumulative counters for a variant
    Metrics {
        id: String,

        /// a, b, or the variant UUID
        variant: String,

        #[arg(long)]
        impressions: Option<u64>,

        #[arg(long)]
        clicks: Option<u64>,

        #[arg(long)]
        conversions: Option<u64>,

        #[arg(long)]
        cost: Option<f64>,
    },

    /// Generate insights and recommendations for a test
    Insights { id: String },

    /// List reusable test templates
    Templates {
        /// Industry filter; general templates are always included
        #[arg(long)]
        industry: Option<String>,
    },

    /// Suggest test types a campaign has not tried yet
    Suggest { campaign: String },

    /// Delete a test
    Delete { id: String },
}

// -- Output structs --

#[derive(Debug, serde::Serialize)]
pub struct AbTestSummary {
    pub id: String,
    pub campaign_id: String,
    pub name: String,
    pub status: String,
    pub test_type: String,
    pub winner: Option<String>,
    pub significance: Option<f64>,
}

impl From<&AbTest> for AbTestSummary {
    fn from(t: &AbTest) -> Self {
        Self {
            id: t.id.to_string(),
            campaign_id: t.campaign_id.clone(),
            name: t.name.clone(),
            status: t.status.as_str().to_string(),
            test_type: t.test_type.as_str().to_string(),
            winner: t.winner.map(|w| w.letter().to_string()),
            significance: t.significance,
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct AbTestListOutput {
    pub tests: Vec<AbTestSummary>,
    pub total: usize,
}

impl CommandOutput for AbTestListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["ID", "Campaign", "Name", "Status", "Type", "Winner"]);
        for t in &self.tests {
            table.add_row(vec![
                t.id[..8].to_string(),
                truncate(&t.campaign_id, 16),
                truncate(&t.name, 28),
                t.status.clone(),
                t.test_type.clone(),
                t.winner.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        render_list("A/B test", &table, self.total)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct AbTestDetailOutput {
    #[serde(flatten)]
    pub test: AbTest,
    /// Significance of the current counters, whether or not the test is done.
    pub current_significance: Option<f64>,
}

fn variant_lines(label: &str, variant: &Variant) -> Vec<String> {
    let m = &variant.metrics;
    vec![
        format!("{label}: {} ({})", variant.name, variant.id),
        format!("  Headline: {}", variant.content.headline),
        format!(
            "  Impressions: {}  Clicks: {}  Conversions: {}  Cost: {:.2}",
            m.impressions, m.clicks, m.conversions, m.cost
        ),
        format!(
            "  CTR: {:.2}%  Conversion rate: {:.2}%",
            m.ctr, m.conversion_rate
        ),
    ]
}

impl CommandOutput for AbTestDetailOutput {
    fn to_human(&self) -> String {
        let t = &self.test;
        let mut lines = vec![
            format!("A/B Test: {}", t.name),
            format!("ID: {}", t.id),
            format!("Campaign: {}", t.campaign_id),
            format!("Status: {}", t.status.as_str()),
            format!("Type: {}", t.test_type.as_str()),
            format!(
                "Target confidence: {}%  Split: {}/{}  Duration: {} day(s)",
                t.confidence_level,
                t.traffic_split,
                100 - u16::from(t.traffic_split),
                t.duration_days
            ),
        ];
        if !t.hypothesis.is_empty() {
            lines.push(format!("Hypothesis: {}", t.hypothesis));
        }
        lines.push(String::new());
        lines.extend(variant_lines("Variant A", &t.variant_a));
        lines.extend(variant_lines("Variant B", &t.variant_b));
        lines.push(String::new());
        match self.current_significance {
            Some(s) => lines.push(format!("Current significance: {s:.1}%")),
            None => lines.push("Current significance: insufficient data".to_string()),
        }
        if let Some(winner) = t.winner {
            lines.push(format!("Winner: Variant {}", winner.letter()));
        }
        lines.join("\n")
    }
}

impl CommandOutput for TestInsights {
    fn to_human(&self) -> String {
        let mut lines = vec![match self.significance {
            Some(s) => format!("Significance: {s:.1}%"),
            None => "Significance: insufficient data".to_string(),
        }];

        if self.insights.is_empty() {
            lines.push("No notable differences between variants yet.".to_string());
        } else {
            lines.push(String::new());
            lines.push("Insights:".to_string());
            for i in &self.insights {
                lines.push(format!(
                    "  [{}] {} ({}% confidence)",
                    i.impact.as_str(),
                    i.title,
                    i.confidence
                ));
                lines.push(format!("      {}", i.description));
            }
        }

        if !self.recommendations.is_empty() {
            lines.push(String::new());
            lines.push("Recommendations:".to_string());
            for r in &self.recommendations {
                lines.push(format!("  [{}] {}", r.priority.as_str(), r.title));
                lines.push(format!("      {}", r.description));
            }
        }
        lines.join("\n")
    }
}

#[derive(Debug, serde::Serialize)]
pub struct TemplateListOutput {
    pub templates: Vec<TestTemplate>,
    pub total: usize,
}

impl CommandOutput for TemplateListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["Template", "Name", "Type", "Industry", "Days", "Min traffic"]);
        for t in &self.templates {
            table.add_row(vec![
                t.template_id.clone(),
                t.name.clone(),
                t.test_type.as_str().to_string(),
                t.industry.clone(),
                t.duration_days.to_string(),
                t.min_traffic.to_string(),
            ]);
        }
        render_list("template", &table, self.total)
    }
}

impl CommandOutput for NextTestSuggestions {
    fn to_human(&self) -> String {
        if self.suggestions.is_empty() {
            return format!(
                "Campaign {} has already tried every test type.",
                self.campaign_id
            );
        }
        let mut lines = vec![format!("Suggested next tests for {}:", self.campaign_id)];
        for s in &self.suggestions {
            lines.push(format!(
                "  [{}] {} ({}, expected lift {})",
                s.priority.as_str(),
                s.title,
                s.test_type.as_str(),
                s.expected_lift
            ));
            lines.push(format!("      {}", s.description));
        }
        lines.join("\n")
    }
}

// -- Execute --

pub async fn execute(args: AbTestArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;
    let service = ctx.ab_test_service();

    match args.command {
        AbTestCommands::Create {
            file,
            campaign,
            name,
            hypothesis,
            test_type,
            headline_a,
            headline_b,
            cta_a,
            cta_b,
            confidence,
            split,
            duration_days,
        } => {
            let input = if let Some(file) = file {
                let raw = tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                serde_json::from_str::<NewAbTest>(&raw)
                    .with_context(|| format!("Invalid A/B test JSON in {}", file.display()))?
            } else {
                let test_type = match test_type {
                    Some(t) => Some(
                        TestType::from_str(&t)
                            .with_context(|| format!("Unknown test type '{t}'"))?,
                    ),
                    None => None,
                };
                NewAbTest {
                    campaign_id: campaign.unwrap_or_default(),
                    name,
                    hypothesis,
                    test_type,
                    confidence_level: confidence,
                    traffic_split: split,
                    duration_days,
                    variant_a: Some(new_variant(headline_a, cta_a)),
                    variant_b: Some(new_variant(headline_b, cta_b)),
                    ..Default::default()
                }
            };

            let test = service.create_test(input).await?;
            output(
                &ActionOutput::ok(format!("Created A/B test '{}'\nID: {}", test.name, test.id)),
                json_mode,
            );
        }

        AbTestCommands::List { campaign } => {
            let tests = match campaign {
                Some(ref campaign_id) => service.get_tests_by_campaign(campaign_id).await?,
                None => service.get_all_tests().await?,
            };
            let out = AbTestListOutput {
                total: tests.len(),
                tests: tests.iter().map(AbTestSummary::from).collect(),
            };
            output(&out, json_mode);
        }

        AbTestCommands::Show { id } => {
            let id = resolve_ab_test_id(&ctx.pool, &id).await?;
            let test = service
                .get_test_by_id(id)
                .await?
                .with_context(|| format!("A/B test not found: {id}"))?;
            let out = AbTestDetailOutput {
                current_significance: test_significance(&test),
                test,
            };
            output(&out, json_mode);
        }

        AbTestCommands::Start { id } => {
            let id = resolve_ab_test_id(&ctx.pool, &id).await?;
            let test = service.start_test(id).await?;
            output(&ActionOutput::ok(format!("A/B test started: {}", test.name)), json_mode);
        }

        AbTestCommands::Pause { id } => {
            let id = resolve_ab_test_id(&ctx.pool, &id).await?;
            let test = service.pause_test(id).await?;
            output(&ActionOutput::ok(format!("A/B test paused: {}", test.name)), json_mode);
        }

        AbTestCommands::Resume { id } => {
            let id = resolve_ab_test_id(&ctx.pool, &id).await?;
            let test = service.resume_test(id).await?;
            output(&ActionOutput::ok(format!("A/B test resumed: {}", test.name)), json_mode);
        }

        AbTestCommands::Stop { id, winner } => {
            let id = resolve_ab_test_id(&ctx.pool, &id).await?;
            let winner = match winner {
                Some(w) => Some(
                    VariantSlot::from_str(&w).with_context(|| format!("Unknown variant '{w}'"))?,
                ),
                None => None,
            };
            let test = service.stop_test(id, winner).await?;
            let message = match (test.winner, test.significance) {
                (Some(w), Some(s)) => format!(
                    "A/B test completed: {} (winner: Variant {}, {s:.1}% significance)",
                    test.name,
                    w.letter()
                ),
                (Some(w), None) => {
                    format!("A/B test completed: {} (winner: Variant {})", test.name, w.letter())
                }
                _ => format!("A/B test completed: {}", test.name),
            };
            output(&ActionOutput::ok(message), json_mode);
        }

        AbTestCommands::Metrics {
            id,
            variant,
            impressions,
            clicks,
            conversions,
            cost,
        } => {
            let id = resolve_ab_test_id(&ctx.pool, &id).await?;
            let test = service
                .get_test_by_id(id)
                .await?
                .with_context(|| format!("A/B test not found: {id}"))?;
            let variant_id = resolve_variant(&test, &variant)?;

            let update = MetricsUpdate {
                impressions,
                clicks,
                conversions,
                cost,
            };
            let test = service.update_test_metrics(id, variant_id, update).await?;

            let mut message = format!("Metrics recorded for {}", test.name);
            if let Some(winner) = test.winner {
                message.push_str(&format!(
                    "\nTest auto-completed: Variant {} wins at {:.1}% significance",
                    winner.letter(),
                    test.significance.unwrap_or_default()
                ));
            }
            output(&ActionOutput::ok(message), json_mode);
        }

        AbTestCommands::Insights { id } => {
            let id = resolve_ab_test_id(&ctx.pool, &id).await?;
            let insights = service.generate_test_insights(id).await?;
            output(&insights, json_mode);
        }

        AbTestCommands::Templates { industry } => {
            let templates = service.get_test_templates(industry.as_deref());
            let out = TemplateListOutput {
                total: templates.len(),
                templates,
            };
            output(&out, json_mode);
        }

        AbTestCommands::Suggest { campaign } => {
            let suggestions = service.suggest_next_test(&campaign).await?;
            output(&suggestions, json_mode);
        }

        AbTestCommands::Delete { id } => {
            let id = resolve_ab_test_id(&ctx.pool, &id).await?;
            let test = service.delete_test(id).await?;
            output(&ActionOutput::ok(format!("A/B test deleted: {}", test.name)), json_mode);
        }
    }

    Ok(())
}

fn new_variant(headline: Option<String>, cta: Option<String>) -> NewVariant {
    NewVariant {
        name: None,
        content: VariantContent {
            headline: headline.unwrap_or_default(),
            cta: cta.unwrap_or_default(),
            ..Default::default()
        },
    }
}

/// Accept `a`/`b` or a full variant UUID.
fn resolve_variant(test: &AbTest, variant: &str) -> Result<Uuid> {
    if let Some(slot) = VariantSlot::from_str(variant) {
        return Ok(test.variant(slot).id);
    }
    Uuid::parse_str(variant).with_context(|| format!("Unknown variant '{variant}'"))
}
