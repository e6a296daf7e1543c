//! Command-line interface for the autopilot engine.

pub mod commands;
pub mod id_resolver;
pub mod output;

use clap::{Parser, Subcommand};

use commands::abtest::AbTestArgs;
use commands::campaign::CampaignArgs;
use commands::init::InitArgs;
use commands::run::RunArgs;
use commands::trigger::TriggerArgs;

#[derive(Parser, Debug)]
#[command(name = "autopilot", version, about = "Autonomous campaign lifecycle and A/B test analysis")]
pub struct Cli {
    /// Emit machine-readable JSON instead of human-readable text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize the project directory, config, database and default triggers
    Init(InitArgs),
    /// Run the lifecycle scheduler until interrupted
    Run(RunArgs),
    /// Manage campaigns and inspect automated actions
    Campaign(CampaignArgs),
    /// Manage per-persona trigger thresholds
    Trigger(TriggerArgs),
    /// Manage A/B tests
    Abtest(AbTestArgs),
}

/// Print an error in the selected output mode and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": causes,
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1);
}
