//! `lumen-probe report` command - summarize recorded trials

use crate::cli::ReportArgs;
use crate::config::Config;
use crate::output;
use crate::results::TrialLog;
use lumen_probe_core::schema::PredictionType;
use lumen_probe_core::trial::SummaryStats;

pub fn execute(config: &Config, args: &ReportArgs) -> anyhow::Result<()> {
    let results_dir = args
        .results_dir
        .clone()
        .unwrap_or_else(|| config.run.results_dir.clone());
    let kinds: Vec<PredictionType> = match args.prediction {
        Some(kind) => vec![kind],
        None => PredictionType::ALL.to_vec(),
    };

    let mut found_any = false;
    for kind in kinds {
        let log = TrialLog::new(&results_dir, kind)?;
        let records = log.load_all()?;
        if records.is_empty() {
            continue;
        }
        found_any = true;
        output::print_report_section(kind, &SummaryStats::from_records(&records));
    }

    if !found_any {
        println!("No recorded trials under {}", results_dir.display());
    }
    Ok(())
}
