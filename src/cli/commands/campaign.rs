//! Campaign CLI commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Deserialize;

use crate::cli::commands::run::TickOutput;
use crate::cli::commands::AppContext;
use crate::cli::output::{list_table, output, render_list, truncate, ActionOutput, CommandOutput};
use crate::domain::models::{ActivityLogEntry, Campaign, CampaignStatus, Config, LifecycleAction};
use crate::domain::ports::CampaignRepository;
use crate::services::lifecycle_controller::engagement_rate;

#[derive(Args, Debug)]
pub struct CampaignArgs {
    #[command(subcommand)]
    pub command: CampaignCommands,
}

#[derive(Subcommand, Debug)]
pub enum CampaignCommands {
    /// Import campaigns from a JSON file (one campaign or an array)
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// List campaigns
    List {
        /// Filter by status (draft, live, extended, pivoted, archived)
        #[arg(long)]
        status: Option<String>,
    },

    /// Run one lifecycle pass over all live campaigns
    Process,

    /// Show the most recent automated actions
    Actions {
        /// Maximum number of entries
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CampaignImport {
    Many(Vec<Campaign>),
    One(Box<Campaign>),
}

impl CampaignImport {
    fn into_vec(self) -> Vec<Campaign> {
        match self {
            Self::Many(campaigns) => campaigns,
            Self::One(campaign) => vec![*campaign],
        }
    }
}

// -- Output structs --

#[derive(Debug, serde::Serialize)]
pub struct CampaignOutput {
    pub id: String,
    pub name: String,
    pub persona: String,
    pub status: String,
    pub posts: usize,
    pub extensions: u32,
    pub engagement_rate: f64,
}

impl From<&Campaign> for CampaignOutput {
    fn from(c: &Campaign) -> Self {
        Self {
            id: c.id.clone(),
            name: c.name.clone(),
            persona: c.persona.clone(),
            status: c.status.as_str().to_string(),
            posts: c.posts.len(),
            extensions: c.extensions,
            engagement_rate: engagement_rate(c),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct CampaignListOutput {
    pub campaigns: Vec<CampaignOutput>,
    pub total: usize,
}

impl CommandOutput for CampaignListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["ID", "Name", "Persona", "Status", "Posts", "Engagement"]);
        for c in &self.campaigns {
            table.add_row(vec![
                truncate(&c.id, 16),
                truncate(&c.name, 28),
                c.persona.clone(),
                c.status.clone(),
                c.posts.to_string(),
                format!("{:.2}%", c.engagement_rate * 100.0),
            ]);
        }
        render_list("campaign", &table, self.total)
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ActionEntryOutput {
    pub id: String,
    pub campaign_id: String,
    pub action: String,
    pub detail: String,
    pub reason: String,
    pub engagement_rate: f64,
    pub timestamp: String,
}

impl From<&ActivityLogEntry> for ActionEntryOutput {
    fn from(entry: &ActivityLogEntry) -> Self {
        let detail = match &entry.action {
            LifecycleAction::Extension {
                new_posts_count,
                winning_format,
            } => format!("+{new_posts_count} {}", winning_format.as_str()),
            LifecycleAction::Pivot {
                from_format,
                to_format,
            } => format!("{} -> {}", from_format.as_str(), to_format.as_str()),
            LifecycleAction::Archive => String::new(),
        };
        Self {
            id: entry.id.to_string(),
            campaign_id: entry.campaign_id.clone(),
            action: entry.kind().as_str().to_string(),
            detail,
            reason: entry.reason.clone(),
            engagement_rate: entry.engagement_rate,
            timestamp: entry.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ActionListOutput {
    pub actions: Vec<ActionEntryOutput>,
    pub total: usize,
}

impl CommandOutput for ActionListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["When", "Campaign", "Action", "Detail", "Engagement"]);
        for a in &self.actions {
            table.add_row(vec![
                a.timestamp.clone(),
                truncate(&a.campaign_id, 16),
                a.action.clone(),
                a.detail.clone(),
                format!("{:.2}%", a.engagement_rate * 100.0),
            ]);
        }
        render_list("action", &table, self.total)
    }
}

// -- Execute --

pub async fn execute(args: CampaignArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;

    match args.command {
        CampaignCommands::Import { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let campaigns = serde_json::from_str::<CampaignImport>(&raw)
                .with_context(|| format!("Invalid campaign JSON in {}", file.display()))?
                .into_vec();

            if let Some(bad) = campaigns.iter().find(|c| c.id.trim().is_empty()) {
                anyhow::bail!("Campaign '{}' has an empty id", bad.name);
            }

            ctx.campaigns.save(&campaigns).await?;
            output(
                &ActionOutput::ok(format!("Imported {} campaign(s)", campaigns.len())),
                json_mode,
            );
        }

        CampaignCommands::List { status } => {
            let filter = match status {
                Some(s) => Some(
                    CampaignStatus::from_str(&s)
                        .with_context(|| format!("Unknown campaign status '{s}'"))?,
                ),
                None => None,
            };
            let campaigns: Vec<CampaignOutput> = ctx
                .campaigns
                .list()
                .await?
                .iter()
                .filter(|c| filter.is_none_or(|status| c.status == status))
                .map(CampaignOutput::from)
                .collect();

            let out = CampaignListOutput {
                total: campaigns.len(),
                campaigns,
            };
            output(&out, json_mode);
        }

        CampaignCommands::Process => {
            let report = ctx.lifecycle_controller().run_tick().await?;
            output(&TickOutput::from(&report), json_mode);
        }

        CampaignCommands::Actions { limit } => {
            let entries = ctx.lifecycle_controller().get_recent_actions(limit).await?;
            let out = ActionListOutput {
                total: entries.len(),
                actions: entries.iter().map(ActionEntryOutput::from).collect(),
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_accepts_single_or_array() {
        let one = r#"{"id":"c1","persona":"medspa","created_at":"2025-01-01T00:00:00Z","updated_at":"2025-01-01T00:00:00Z"}"#;
        let parsed: CampaignImport = serde_json::from_str(one).unwrap();
        assert_eq!(parsed.into_vec().len(), 1);

        let many = format!("[{one},{}]", one.replace("c1", "c2"));
        let parsed: CampaignImport = serde_json::from_str(&many).unwrap();
        let ids: Vec<String> = parsed.into_vec().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[test]
    fn test_action_detail_formatting() {
        let entry = ActivityLogEntry::new(
            "c1",
            LifecycleAction::Pivot {
                from_format: crate::domain::models::PostFormat::Reels,
                to_format: crate::domain::models::PostFormat::Story,
            },
            0.02,
            chrono::Utc::now(),
        );
        let out = ActionEntryOutput::from(&entry);
        assert_eq!(out.action, "pivot");
        assert_eq!(out.detail, "reels -> story");
    }
}
