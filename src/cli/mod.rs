//! Command-line interface for the cooperative surplus engines.

pub mod commands;
pub mod documents;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::negotiate::NegotiateArgs;
use commands::settle::SettleArgs;
use commands::surplus::SurplusArgs;

#[derive(Parser, Debug)]
#[command(name = "coopsurplus")]
#[command(about = "Cooperative surplus valuation and negotiation for agent task clusters", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .coopsurplus/config.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the surplus pool of a task cluster
    Surplus(SurplusArgs),
    /// Negotiate the split of an existing surplus pool
    Negotiate(NegotiateArgs),
    /// Compute a cluster's surplus and negotiate its split in one pass
    Settle(SettleArgs),
}

/// Report a failed command and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({
            "error": err.to_string(),
            "chain": err.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
