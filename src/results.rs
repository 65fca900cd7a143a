//! Append-only JSONL log of trial records

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use lumen_probe_core::schema::PredictionType;
use lumen_probe_core::trial::TrialRecord;

pub struct TrialLog {
    log_path: PathBuf,
}

impl TrialLog {
    /// One file per prediction type, e.g. `results/daily.jsonl`
    pub fn new(results_dir: &Path, kind: PredictionType) -> Result<Self> {
        std::fs::create_dir_all(results_dir).with_context(|| {
            format!("Failed to create results directory {}", results_dir.display())
        })?;
        Ok(Self {
            log_path: results_dir.join(format!("{kind}.jsonl")),
        })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn append(&self, record: &TrialRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open {}", self.log_path.display()))?;

        let line = serde_json::to_string(record)?;
        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write to {}", self.log_path.display()))?;
        Ok(())
    }

    pub fn load_all(&self) -> Result<Vec<TrialRecord>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line
                .with_context(|| format!("Failed to read line from {}", self.log_path.display()))?;
            let record: TrialRecord =
                serde_json::from_str(&line).context("Failed to parse trial record")?;
            records.push(record);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(trial: usize, success: bool) -> TrialRecord {
        TrialRecord {
            trial,
            timestamp: Utc::now(),
            prediction: PredictionType::Daily,
            language: None,
            success,
            elapsed_secs: 1.5,
            field_count: 0,
            parse_error_count: 0,
            usage: None,
            validation: None,
            quality: None,
            failure: None,
        }
    }

    #[test]
    fn append_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let log = TrialLog::new(dir.path(), PredictionType::Daily).unwrap();

        log.append(&record(1, true)).unwrap();
        log.append(&record(2, false)).unwrap();

        let records = log.load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].trial, 1);
        assert!(records[0].success);
        assert!(!records[1].success);
    }

    #[test]
    fn missing_log_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = TrialLog::new(dir.path(), PredictionType::Yearly).unwrap();
        assert!(log.load_all().unwrap().is_empty());
    }

    #[test]
    fn log_file_is_named_after_the_prediction_type() {
        let dir = tempfile::tempdir().unwrap();
        let log = TrialLog::new(dir.path(), PredictionType::Lifetime).unwrap();
        assert!(log.path().ends_with("lifetime.jsonl"));
    }

    #[test]
    fn creates_nested_results_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b");
        let log = TrialLog::new(&nested, PredictionType::Daily).unwrap();
        log.append(&record(1, true)).unwrap();
        assert!(nested.join("daily.jsonl").exists());
    }

    #[test]
    fn results_dir_blocked_by_a_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("results");
        std::fs::write(&blocker, "a file where the directory should go").unwrap();

        let err = TrialLog::new(&blocker, PredictionType::Daily).err().unwrap();
        assert!(err.to_string().contains("Failed to create results directory"));
    }

    #[test]
    fn corrupt_line_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = TrialLog::new(dir.path(), PredictionType::Daily).unwrap();
        std::fs::write(log.path(), "not json\n").unwrap();
        let err = log.load_all().unwrap_err();
        assert!(err.to_string().contains("Failed to parse trial record"));
    }
}
