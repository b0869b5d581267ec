//! Cooperative surplus CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;

use cooperative_surplus::cli::{commands, handle_error, Cli, Commands};
use cooperative_surplus::domain::models::Config;
use cooperative_surplus::infrastructure::config::ConfigLoader;
use cooperative_surplus::infrastructure::logging::{LogConfig, LoggerImpl};

fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;

    if let Err(err) = run(cli) {
        handle_error(err, json_mode);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = load_config(&cli)?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
        ConfigLoader::validate(&config)?;
    }

    let log_config = LogConfig::try_from(&config.logging)?;
    let _logger = LoggerImpl::init(&log_config).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Surplus(args) => commands::surplus::execute(args, &config, cli.json),
        Commands::Negotiate(args) => commands::negotiate::execute(args, &config, cli.json),
        Commands::Settle(args) => commands::settle::execute(args, &config, cli.json),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}
