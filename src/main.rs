//! Lumen Probe - content quality harness for LLM-generated predictions
//!
//! Drives trial batches against a chat-completion endpoint, parses the
//! tab-separated responses, validates them against per-type schemas, and
//! scans the content for refusals and language mixing.

mod cli;
mod client;
mod commands;
mod config;
mod generate;
mod output;
mod profile;
mod prompt;
mod results;
mod runner;

use clap::Parser;

use cli::{Cli, Commands};
use config::Config;
use lumen_probe_core::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.quiet {
        Some("error")
    } else {
        cli.log_level.as_deref()
    };
    if let Err(e) = logging::init_tracing(cli.verbose, log_level, cli.log_json) {
        // If tracing initialization fails, fall back to stderr
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    let config = Config::load_or_default(&cli.config)?;

    match &cli.command {
        Commands::Run(args) => commands::run::execute(&config, args, cli.quiet).await,
        Commands::Check(args) => commands::check::execute(&config, args, cli.quiet),
        Commands::Schemas { prediction } => {
            commands::schemas::execute(*prediction);
            Ok(())
        }
        Commands::Report(args) => commands::report::execute(&config, args),
    }
}
