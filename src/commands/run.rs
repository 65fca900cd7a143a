//! `lumen-probe run` command - execute a batch of generation trials
//!
//! Live runs call the chat-completion API; `--replay` swaps in a canned
//! response file so the downstream stages can be exercised offline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;

use crate::cli::RunArgs;
use crate::client::HttpGenerator;
use crate::config::Config;
use crate::generate::{Generator, ReplayGenerator};
use crate::output;
use crate::profile::SubjectProfile;
use crate::prompt;
use crate::results::TrialLog;
use crate::runner::{self, TrialPlan};
use lumen_probe_core::schema::Schema;
use lumen_probe_core::tabular::DuplicatePolicy;
use lumen_probe_core::trial::SummaryStats;

pub async fn execute(config: &Config, args: &RunArgs, quiet: bool) -> anyhow::Result<()> {
    let schema = match &args.schema {
        Some(path) => Schema::load(path)?,
        None => Schema::builtin(args.prediction),
    };
    let profile = match &args.profile {
        Some(path) => SubjectProfile::load(path)?,
        None => SubjectProfile::default(),
    };

    let mut api = config.api.clone();
    if let Some(timeout_secs) = args.timeout_secs {
        api.timeout_secs = timeout_secs;
    }

    let prompt = prompt::build(args.prediction, args.language, &profile);
    let mut generator: Box<dyn Generator> = match &args.replay {
        Some(path) => Box::new(ReplayGenerator::from_file(path)?),
        None => Box::new(HttpGenerator::new(&api, prompt)?),
    };

    let plan = TrialPlan {
        schema,
        language: args.language,
        trials: args.trials.unwrap_or(config.run.trials),
        delay_secs: args.delay_secs.unwrap_or(config.run.delay_secs),
        duplicates: if args.last_wins {
            DuplicatePolicy::LastWins
        } else {
            DuplicatePolicy::FirstWins
        },
        analyzer: config.quality.analyzer(),
        quiet,
    };

    let results_dir = args
        .results_dir
        .clone()
        .unwrap_or_else(|| config.run.results_dir.clone());
    let log = TrialLog::new(&results_dir, args.prediction)?;

    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = stop.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
        eprintln!("\nInterrupt received, finishing the current trial...");
    })
    .context("Failed to install Ctrl-C handler")?;

    if !quiet {
        output::print_run_header(
            args.prediction,
            args.language,
            plan.trials,
            &generator.describe(),
        );
    }

    let records = runner::run_trials(&plan, generator.as_mut(), &log, &stop).await?;
    let stats = SummaryStats::from_records(&records);
    output::print_summary(&stats);
    println!("Records appended to {}", log.path().display());

    let not_valid = stats.total - stats.valid;
    if not_valid > 0 {
        anyhow::bail!(
            "{not_valid} of {} trial(s) did not produce a valid response",
            stats.total
        );
    }
    Ok(())
}
