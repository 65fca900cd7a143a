//! Trial records and aggregate statistics
//!
//! One [`TrialRecord`] is produced per generation attempt, successful or
//! not, and persisted as a JSONL line. [`SummaryStats`] aggregates a run:
//! latency statistics cover the successful subset only, while counts and
//! failure reasons cover every trial.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quality::{Language, QualityReport};
use crate::schema::PredictionType;
use crate::validate::ValidationResult;

/// Token accounting reported by the backend, when it reports any
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub cached_tokens: Option<u64>,
}

/// Why a generation attempt produced no usable content
#[derive(Error, Debug)]
pub enum GenerationFailure {
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    #[error("timed out after {limit_secs}s")]
    Timeout { limit_secs: f64 },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("malformed response: {message}")]
    Malformed { message: String },
}

/// Raw content returned by a generation backend
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// Everything recorded about one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// 1-based position within the run
    pub trial: usize,
    pub timestamp: DateTime<Utc>,
    pub prediction: PredictionType,
    pub language: Option<Language>,
    pub success: bool,
    /// Wall-clock seconds spent in the generation call only
    pub elapsed_secs: f64,
    pub field_count: usize,
    pub parse_error_count: usize,
    pub usage: Option<TokenUsage>,
    pub validation: Option<ValidationResult>,
    pub quality: Option<QualityReport>,
    /// Failure description when `success` is false
    pub failure: Option<String>,
}

impl TrialRecord {
    /// Generation succeeded and the response was structurally valid
    pub fn passed(&self) -> bool {
        self.success && self.validation.as_ref().is_some_and(|v| v.valid)
    }
}

/// Aggregate view of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    /// Successful trials whose response also passed validation
    pub valid: usize,
    pub mean_secs: Option<f64>,
    pub min_secs: Option<f64>,
    pub max_secs: Option<f64>,
    pub failure_reasons: Vec<String>,
}

impl SummaryStats {
    pub fn from_records(records: &[TrialRecord]) -> Self {
        let mut durations = Vec::new();
        let mut failure_reasons = Vec::new();
        let mut valid = 0;

        for record in records {
            if record.success {
                durations.push(record.elapsed_secs);
                if record.passed() {
                    valid += 1;
                }
            } else {
                let reason = record.failure.as_deref().unwrap_or("unknown");
                failure_reasons.push(format!("trial {}: {reason}", record.trial));
            }
        }

        let successes = durations.len();
        let mean_secs = if durations.is_empty() {
            None
        } else {
            Some(durations.iter().sum::<f64>() / durations.len() as f64)
        };

        SummaryStats {
            total: records.len(),
            successes,
            failures: records.len() - successes,
            valid,
            mean_secs,
            min_secs: durations.iter().copied().reduce(f64::min),
            max_secs: durations.iter().copied().reduce(f64::max),
            failure_reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::tabular::FieldMap;
    use crate::validate::validate;

    fn record(trial: usize, success: bool, elapsed_secs: f64) -> TrialRecord {
        TrialRecord {
            trial,
            timestamp: Utc::now(),
            prediction: PredictionType::Daily,
            language: None,
            success,
            elapsed_secs,
            field_count: 0,
            parse_error_count: 0,
            usage: None,
            validation: None,
            quality: None,
            failure: (!success).then(|| "HTTP 500: upstream error".to_string()),
        }
    }

    fn valid_record(trial: usize, elapsed_secs: f64) -> TrialRecord {
        let schema = Schema::lifetime();
        let mut fields = FieldMap::new();
        for field in &schema.required {
            fields.insert(field.clone(), "value");
        }
        TrialRecord {
            validation: Some(validate(&schema, &fields)),
            ..record(trial, true, elapsed_secs)
        }
    }

    #[test]
    fn stats_cover_only_successful_durations() {
        let records = vec![
            valid_record(1, 1.0),
            record(2, false, 30.0),
            valid_record(3, 3.0),
        ];
        let stats = SummaryStats::from_records(&records);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.successes, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.valid, 2);
        assert_eq!(stats.mean_secs, Some(2.0));
        assert_eq!(stats.min_secs, Some(1.0));
        assert_eq!(stats.max_secs, Some(3.0));
    }

    #[test]
    fn failure_reasons_name_the_trial() {
        let records = vec![record(1, false, 5.0), record(2, false, 6.0)];
        let stats = SummaryStats::from_records(&records);
        assert_eq!(stats.successes, 0);
        assert_eq!(stats.mean_secs, None);
        assert_eq!(stats.min_secs, None);
        assert_eq!(
            stats.failure_reasons,
            vec![
                "trial 1: HTTP 500: upstream error",
                "trial 2: HTTP 500: upstream error",
            ]
        );
    }

    #[test]
    fn empty_run_has_empty_stats() {
        let stats = SummaryStats::from_records(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.valid, 0);
        assert!(stats.failure_reasons.is_empty());
        assert_eq!(stats.max_secs, None);
    }

    #[test]
    fn successful_but_invalid_trials_do_not_count_as_valid() {
        // No validation attached at all
        let no_validation = vec![record(1, true, 2.0)];
        assert_eq!(SummaryStats::from_records(&no_validation).valid, 0);

        // Validation attached but failing
        let schema = Schema::lifetime();
        let mut invalid = record(1, true, 2.0);
        invalid.validation = Some(validate(&schema, &FieldMap::new()));
        assert!(!invalid.passed());
        assert_eq!(SummaryStats::from_records(&[invalid]).valid, 0);
    }

    #[test]
    fn generation_failures_display_their_classification() {
        let failure = GenerationFailure::Timeout { limit_secs: 60.0 };
        assert_eq!(failure.to_string(), "timed out after 60s");

        let failure = GenerationFailure::Status {
            code: 429,
            message: "rate limited".to_string(),
        };
        assert_eq!(failure.to_string(), "HTTP 429: rate limited");
    }

    #[test]
    fn records_round_trip_through_json() {
        let record = valid_record(4, 12.5);
        let json = serde_json::to_string(&record).unwrap();
        let back: TrialRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert!(back.passed());
    }
}
