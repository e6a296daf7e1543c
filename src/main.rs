//! Autopilot CLI entry point.

use clap::Parser;

use autopilot::cli::{commands, handle_error, Cli, Commands};
use autopilot::infrastructure::config::ConfigLoader;
use autopilot::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load() {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(args, &config, cli.json).await,
        Commands::Run(args) => commands::run::execute(args, &config, cli.json).await,
        Commands::Campaign(args) => commands::campaign::execute(args, &config, cli.json).await,
        Commands::Trigger(args) => commands::trigger::execute(args, &config, cli.json).await,
        Commands::Abtest(args) => commands::abtest::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
