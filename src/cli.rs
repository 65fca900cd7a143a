use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use lumen_probe_core::quality::Language;
use lumen_probe_core::schema::PredictionType;

/// Content test harness for the Lumen prediction service
#[derive(Parser)]
#[command(name = "lumen-probe", version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = "lumen-probe.toml")]
    pub config: PathBuf,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output logs as JSON to stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run timed generation trials and validate every response
    Run(RunArgs),

    /// Parse, validate, and analyze a saved response file
    Check(CheckArgs),

    /// List the built-in schemas, or show one in full
    Schemas {
        /// Prediction type to show in full
        #[arg(value_parser = parse_prediction_type)]
        prediction: Option<PredictionType>,
    },

    /// Summarize previously recorded trials
    Report(ReportArgs),
}

#[derive(Args)]
pub struct RunArgs {
    /// Prediction type to request
    #[arg(long = "type", short = 'T', value_parser = parse_prediction_type, default_value = "daily")]
    pub prediction: PredictionType,

    /// Target language for field values (en, zh, zh-tw, es)
    #[arg(long, short = 'l', value_parser = parse_language, default_value = "en")]
    pub language: Language,

    /// Number of trials to run
    #[arg(long, short = 'n')]
    pub trials: Option<usize>,

    /// Seconds to wait between trials
    #[arg(long)]
    pub delay_secs: Option<f64>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<f64>,

    /// Replay a canned response file instead of calling the API
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Subject profile YAML (defaults to the built-in subject)
    #[arg(long)]
    pub profile: Option<PathBuf>,

    /// Custom schema YAML overriding the built-in one
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Keep the last value when a key repeats (default keeps the first)
    #[arg(long)]
    pub last_wins: bool,

    /// Directory for the JSONL trial log
    #[arg(long)]
    pub results_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Response file to check
    pub file: PathBuf,

    /// Prediction type to validate against
    #[arg(long = "type", short = 'T', value_parser = parse_prediction_type, default_value = "daily")]
    pub prediction: PredictionType,

    /// Target language; enables the language-mixing check for zh/zh-tw
    #[arg(long, short = 'l', value_parser = parse_language)]
    pub language: Option<Language>,

    /// Custom schema YAML overriding the built-in one
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Keep the last value when a key repeats (default keeps the first)
    #[arg(long)]
    pub last_wins: bool,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Directory holding the JSONL trial log
    #[arg(long)]
    pub results_dir: Option<PathBuf>,

    /// Only include trials of this prediction type
    #[arg(long = "type", short = 'T', value_parser = parse_prediction_type)]
    pub prediction: Option<PredictionType>,
}

fn parse_prediction_type(s: &str) -> Result<PredictionType, String> {
    s.parse()
        .map_err(|e: lumen_probe_core::error::ProbeError| e.to_string())
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse()
        .map_err(|e: lumen_probe_core::error::ProbeError| e.to_string())
}
