//! Serial trial execution
//!
//! Trials run strictly one after another with an optional pause between
//! them, so rate limits stay honest and per-trial latency is meaningful.
//! A stop flag set by the Ctrl-C handler is honored between trials and
//! cuts the pause short; the trial in flight always completes and is
//! recorded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};

use crate::generate::Generator;
use crate::output;
use crate::results::TrialLog;
use lumen_probe_core::quality::{self, AnalyzerConfig, Language};
use lumen_probe_core::schema::Schema;
use lumen_probe_core::tabular::{self, DuplicatePolicy};
use lumen_probe_core::trial::TrialRecord;
use lumen_probe_core::validate;

pub struct TrialPlan {
    pub schema: Schema,
    pub language: Language,
    pub trials: usize,
    pub delay_secs: f64,
    pub duplicates: DuplicatePolicy,
    pub analyzer: AnalyzerConfig,
    /// Skip the per-trial console sections, keeping only the summary
    pub quiet: bool,
}

pub async fn run_trials(
    plan: &TrialPlan,
    generator: &mut dyn Generator,
    log: &TrialLog,
    stop: &AtomicBool,
) -> anyhow::Result<Vec<TrialRecord>> {
    let delay = Duration::from_secs_f64(plan.delay_secs);
    let mut records = Vec::new();

    for trial in 1..=plan.trials {
        if trial > 1 && !delay.is_zero() && !stop.load(Ordering::SeqCst) {
            pause_between_trials(delay, stop).await;
        }
        if stop.load(Ordering::SeqCst) {
            warn!("interrupted, stopping after {} trial(s)", records.len());
            break;
        }

        if !plan.quiet {
            output::print_trial_header(trial, plan.trials);
        }
        let record = run_one(plan, generator, trial).await;
        info!(
            trial,
            success = record.success,
            elapsed_secs = record.elapsed_secs,
            "trial finished"
        );
        log.append(&record)?;
        records.push(record);
    }

    Ok(records)
}

/// Sleep in short slices so a stop request cuts the pause short
async fn pause_between_trials(delay: Duration, stop: &AtomicBool) {
    const SLICE: Duration = Duration::from_millis(100);
    let mut remaining = delay;
    while !remaining.is_zero() && !stop.load(Ordering::SeqCst) {
        let step = remaining.min(SLICE);
        tokio::time::sleep(step).await;
        remaining -= step;
    }
}

async fn run_one(plan: &TrialPlan, generator: &mut dyn Generator, trial: usize) -> TrialRecord {
    let timestamp = Utc::now();
    let start = Instant::now();
    let outcome = generator.generate().await;
    let elapsed_secs = start.elapsed().as_secs_f64();

    match outcome {
        Ok(generated) => {
            let parsed = tabular::parse(&generated.content, plan.duplicates);
            let validation = validate::validate(&plan.schema, &parsed.fields);
            let quality = quality::analyze(&parsed.fields, Some(plan.language), &plan.analyzer);

            if !plan.quiet {
                output::print_generation(elapsed_secs, generated.usage.as_ref());
                output::print_parse_outcome(parsed.fields.len(), &parsed.errors);
                output::print_validation(&validation);
                output::print_quality(&quality);
            }

            TrialRecord {
                trial,
                timestamp,
                prediction: plan.schema.kind,
                language: Some(plan.language),
                success: true,
                elapsed_secs,
                field_count: parsed.fields.len(),
                parse_error_count: parsed.errors.len(),
                usage: generated.usage,
                validation: Some(validation),
                quality: Some(quality),
                failure: None,
            }
        }
        Err(failure) => {
            if !plan.quiet {
                output::print_failure(&failure.to_string());
            }
            TrialRecord {
                trial,
                timestamp,
                prediction: plan.schema.kind,
                language: Some(plan.language),
                success: false,
                elapsed_secs,
                field_count: 0,
                parse_error_count: 0,
                usage: None,
                validation: None,
                quality: None,
                failure: Some(failure.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lumen_probe_core::trial::{GenerationFailure, GenerationOutput, SummaryStats};
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    struct ScriptedGenerator {
        script: VecDeque<Result<GenerationOutput, GenerationFailure>>,
        calls: Arc<AtomicUsize>,
        stop_after_first: Option<Arc<AtomicBool>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<Result<GenerationOutput, GenerationFailure>>) -> Self {
            Self {
                script: script.into(),
                calls: Arc::new(AtomicUsize::new(0)),
                stop_after_first: None,
            }
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&mut self) -> Result<GenerationOutput, GenerationFailure> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                if let Some(flag) = &self.stop_after_first {
                    flag.store(true, Ordering::SeqCst);
                }
            }
            self.script.pop_front().unwrap_or_else(|| {
                Err(GenerationFailure::Transport {
                    message: "script exhausted".to_string(),
                })
            })
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn ok(content: &str) -> Result<GenerationOutput, GenerationFailure> {
        Ok(GenerationOutput {
            content: content.to_string(),
            usage: None,
        })
    }

    fn valid_lifetime_response() -> String {
        Schema::lifetime()
            .required
            .iter()
            .map(|field| format!("{field}\tsome value"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn plan(trials: usize) -> TrialPlan {
        TrialPlan {
            schema: Schema::lifetime(),
            language: Language::English,
            trials,
            delay_secs: 0.0,
            duplicates: DuplicatePolicy::FirstWins,
            analyzer: AnalyzerConfig::default(),
            quiet: false,
        }
    }

    fn log_in(dir: &tempfile::TempDir) -> TrialLog {
        TrialLog::new(dir.path(), lumen_probe_core::schema::PredictionType::Lifetime).unwrap()
    }

    #[tokio::test]
    async fn all_valid_trials_pass() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        let response = valid_lifetime_response();
        let mut generator =
            ScriptedGenerator::new(vec![ok(&response), ok(&response), ok(&response)]);

        let records = run_trials(&plan(3), &mut generator, &log, &AtomicBool::new(false))
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.passed()));
        assert_eq!(
            records.iter().map(|r| r.trial).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[tokio::test]
    async fn failure_records_capture_the_reason() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        let mut generator = ScriptedGenerator::new(vec![Err(GenerationFailure::Status {
            code: 500,
            message: "boom".to_string(),
        })]);

        let records = run_trials(&plan(1), &mut generator, &log, &AtomicBool::new(false))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(!records[0].success);
        assert!(!records[0].passed());
        assert_eq!(records[0].failure.as_deref(), Some("HTTP 500: boom"));
        assert!(records[0].validation.is_none());
    }

    #[tokio::test]
    async fn mixed_run_keeps_every_record() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        let valid = valid_lifetime_response();
        let mut generator = ScriptedGenerator::new(vec![
            ok(&valid),
            Err(GenerationFailure::Timeout { limit_secs: 60.0 }),
            ok("pillars_id\tonly one field"),
        ]);

        let records = run_trials(&plan(3), &mut generator, &log, &AtomicBool::new(false))
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert!(records[0].passed());
        assert!(!records[1].success);
        assert!(records[2].success);
        assert!(!records[2].passed());

        let stats = SummaryStats::from_records(&records);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.successes, 2);
        assert_eq!(stats.valid, 1);
        assert_eq!(stats.failure_reasons, vec!["trial 2: timed out after 60s"]);
    }

    #[tokio::test]
    async fn preset_stop_flag_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        let mut generator = ScriptedGenerator::new(vec![ok("a\tb")]);

        let records = run_trials(&plan(5), &mut generator, &log, &AtomicBool::new(true))
            .await
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stop_during_a_trial_finishes_that_trial_only() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        let stop = Arc::new(AtomicBool::new(false));
        let mut generator = ScriptedGenerator::new(vec![ok("a\tb"), ok("a\tb"), ok("a\tb")]);
        generator.stop_after_first = Some(stop.clone());

        let records = run_trials(&plan(3), &mut generator, &log, &stop)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_set_during_a_trial_skips_the_pause() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        let stop = Arc::new(AtomicBool::new(false));
        let mut generator = ScriptedGenerator::new(vec![ok("a\tb"), ok("a\tb")]);
        generator.stop_after_first = Some(stop.clone());
        let mut plan = plan(2);
        plan.delay_secs = 30.0;

        let started = Instant::now();
        let records = run_trials(&plan, &mut generator, &log, &stop)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn stop_during_the_pause_cuts_it_short() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        let stop = Arc::new(AtomicBool::new(false));
        let setter = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            setter.store(true, Ordering::SeqCst);
        });
        let mut generator = ScriptedGenerator::new(vec![ok("a\tb"), ok("a\tb")]);
        let mut plan = plan(2);
        plan.delay_secs = 30.0;

        let started = Instant::now();
        let records = run_trials(&plan, &mut generator, &log, &stop)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn records_are_persisted_as_they_complete() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_in(&dir);
        let valid = valid_lifetime_response();
        let mut generator = ScriptedGenerator::new(vec![
            ok(&valid),
            Err(GenerationFailure::Transport {
                message: "connection reset".to_string(),
            }),
        ]);

        let records = run_trials(&plan(2), &mut generator, &log, &AtomicBool::new(false))
            .await
            .unwrap();

        let persisted = log.load_all().unwrap();
        assert_eq!(persisted.len(), records.len());
        assert_eq!(persisted[0].trial, 1);
        assert!(persisted[0].success);
        assert!(!persisted[1].success);
    }
}
