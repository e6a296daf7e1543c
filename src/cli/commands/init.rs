//! Implementation of the `autopilot init` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tokio::fs;
use tracing::info;

use crate::cli::commands::AppContext;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, TriggerConfig};
use crate::domain::ports::TriggerConfigStore;
use crate::infrastructure::config::{ConfigLoader, PROJECT_DIR};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite the config file and reset default trigger thresholds
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
    pub config_written: bool,
    pub database_path: String,
    pub triggers_seeded: Vec<String>,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push(format!("Wrote {}", self.config_path.display()));
        }
        lines.push(format!("Database ready at {}", self.database_path));
        if !self.triggers_seeded.is_empty() {
            lines.push(format!(
                "Seeded trigger thresholds: {}",
                self.triggers_seeded.join(", ")
            ));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, config: &Config, json_mode: bool) -> Result<()> {
    let project_dir = PathBuf::from(PROJECT_DIR);
    fs::create_dir_all(&project_dir)
        .await
        .with_context(|| format!("Failed to create {}", project_dir.display()))?;

    let config_path = project_dir.join("config.yaml");
    let config_written = if args.force || !config_path.exists() {
        fs::write(&config_path, ConfigLoader::default_yaml()?)
            .await
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        true
    } else {
        false
    };

    let ctx = AppContext::open(config).await?;

    let mut triggers_seeded = Vec::new();
    for defaults in TriggerConfig::defaults() {
        if args.force || ctx.triggers.get(&defaults.persona).await?.is_none() {
            ctx.triggers.upsert(&defaults).await?;
            triggers_seeded.push(defaults.persona);
        }
    }

    info!(
        config_written,
        seeded = triggers_seeded.len(),
        "project initialized"
    );

    let out = InitOutput {
        success: true,
        message: "Autopilot project initialized.".to_string(),
        config_path,
        config_written,
        database_path: config.database.path.clone(),
        triggers_seeded,
    };
    output(&out, json_mode);
    Ok(())
}
