//! Trigger threshold CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::commands::AppContext;
use crate::cli::output::{list_table, output, render_list, ActionOutput, CommandOutput};
use crate::domain::models::{Config, TriggerConfig};
use crate::domain::ports::TriggerConfigStore;

#[derive(Args, Debug)]
pub struct TriggerArgs {
    #[command(subcommand)]
    pub command: TriggerCommands,
}

#[derive(Subcommand, Debug)]
pub enum TriggerCommands {
    /// List configured thresholds per persona
    List,

    /// Create or update thresholds for a persona
    Set {
        /// Persona the thresholds apply to
        #[arg(long)]
        persona: String,

        /// Engagement rate at or above which campaigns are extended (fraction, e.g. 0.025)
        #[arg(long)]
        min_engagement: f64,

        /// Reach velocity required alongside the engagement rate
        #[arg(long)]
        min_velocity: f64,

        /// Engagement rate below which campaigns are archived
        #[arg(long)]
        failure: f64,

        /// Posts added per extension
        #[arg(long, default_value_t = 2)]
        posts: u32,

        /// Hours between synthesized posts
        #[arg(long, default_value_t = 6)]
        spacing: u32,
    },
}

#[derive(Debug, serde::Serialize)]
pub struct TriggerListOutput {
    pub triggers: Vec<TriggerConfig>,
    pub total: usize,
}

impl CommandOutput for TriggerListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&[
            "Persona",
            "Min engagement",
            "Min velocity",
            "Failure",
            "Posts",
            "Spacing",
        ]);
        for t in &self.triggers {
            table.add_row(vec![
                t.persona.clone(),
                format!("{:.2}%", t.min_engagement_rate * 100.0),
                format!("{:.2}", t.min_reach_velocity),
                format!("{:.2}%", t.failure_threshold * 100.0),
                t.extension_post_count.to_string(),
                format!("{}h", t.max_post_spacing_hours),
            ]);
        }
        render_list("trigger config", &table, self.total)
    }
}

pub async fn execute(args: TriggerArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::open(config).await?;

    match args.command {
        TriggerCommands::List => {
            let triggers = ctx.triggers.list().await?;
            let out = TriggerListOutput {
                total: triggers.len(),
                triggers,
            };
            output(&out, json_mode);
        }

        TriggerCommands::Set {
            persona,
            min_engagement,
            min_velocity,
            failure,
            posts,
            spacing,
        } => {
            let trigger = TriggerConfig::new(persona, min_engagement, min_velocity, failure, posts)
                .with_post_spacing(spacing);
            ctx.triggers.upsert(&trigger).await?;
            output(
                &ActionOutput::ok(format!("Trigger thresholds saved for '{}'", trigger.persona)),
                json_mode,
            );
        }
    }

    Ok(())
}
