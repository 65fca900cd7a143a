//! Console output formatting for runs and reports

use lumen_probe_core::quality::{Language, LanguageVerdict, QualityReport};
use lumen_probe_core::schema::PredictionType;
use lumen_probe_core::tabular::ParseError;
use lumen_probe_core::trial::{SummaryStats, TokenUsage};
use lumen_probe_core::validate::ValidationResult;

const MAX_PARSE_ERRORS_SHOWN: usize = 10;

pub fn print_run_header(kind: PredictionType, language: Language, trials: usize, source: &str) {
    println!("Prediction: {kind}");
    println!("Language: {} ({})", language.display_name(), language.code());
    println!("Trials: {trials}");
    println!("Source: {source}");
}

pub fn print_trial_header(trial: usize, total: usize) {
    println!("\n--- Trial {trial}/{total} ---");
}

pub fn print_generation(elapsed_secs: f64, usage: Option<&TokenUsage>) {
    match usage {
        Some(usage) => {
            let cached = usage
                .cached_tokens
                .map(|n| format!(", {} cached", n))
                .unwrap_or_default();
            println!(
                "Generated in {:.2}s ({} prompt + {} completion = {} tokens{})",
                elapsed_secs,
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens,
                cached
            );
        }
        None => println!("Generated in {:.2}s", elapsed_secs),
    }
}

pub fn print_parse_outcome(field_count: usize, errors: &[ParseError]) {
    println!("Fields parsed: {field_count}");
    if errors.is_empty() {
        return;
    }
    println!("Parse errors: {}", errors.len());
    for error in errors.iter().take(MAX_PARSE_ERRORS_SHOWN) {
        println!("  {error}");
    }
    if errors.len() > MAX_PARSE_ERRORS_SHOWN {
        println!("  ... and {} more", errors.len() - MAX_PARSE_ERRORS_SHOWN);
    }
}

pub fn print_validation(result: &ValidationResult) {
    if result.valid {
        println!("Validation: PASS");
        return;
    }
    println!("Validation: FAIL");
    if !result.missing.is_empty() {
        println!(
            "  Missing {} field(s): {}",
            result.missing.len(),
            result.missing.join(", ")
        );
    }
    for violation in &result.violations {
        println!("  {violation}");
    }
}

pub fn print_quality(report: &QualityReport) {
    if report.is_clean() {
        println!("Quality: clean ({} fields analyzed)", report.analyzed);
    } else {
        println!("Quality: {} fields analyzed", report.analyzed);
        for hit in &report.refusals {
            println!(
                "  Refusal in {}: \"{}\" (matched '{}')",
                hit.field, hit.snippet, hit.phrase
            );
        }
        if !report.empty_fields.is_empty() {
            println!("  Empty fields: {}", report.empty_fields.join(", "));
        }
    }
    if let Some(language) = &report.language {
        let verdict = match language.verdict {
            LanguageVerdict::Good => "good",
            LanguageVerdict::Warning => "WARNING",
        };
        println!(
            "Language ({}): {} consistent, {} foreign-heavy [{}]",
            language.target.code(),
            language.consistent,
            language.foreign_heavy.len(),
            verdict
        );
        if !language.foreign_heavy.is_empty() {
            println!("  Foreign-heavy: {}", language.foreign_heavy.join(", "));
        }
    }
}

pub fn print_failure(reason: &str) {
    println!("Generation failed: {reason}");
}

pub fn print_summary(stats: &SummaryStats) {
    println!("\n--- Run Summary ---");
    println!("Trials: {}", stats.total);
    println!("Successes: {}", stats.successes);
    println!("Failures: {}", stats.failures);
    println!("Valid responses: {}", stats.valid);
    if let (Some(mean), Some(min), Some(max)) = (stats.mean_secs, stats.min_secs, stats.max_secs) {
        println!(
            "Latency: mean {:.2}s, min {:.2}s, max {:.2}s",
            mean, min, max
        );
    }
    if !stats.failure_reasons.is_empty() {
        println!("Failure reasons:");
        for reason in &stats.failure_reasons {
            println!("  {reason}");
        }
    }
}

pub fn print_report_section(kind: PredictionType, stats: &SummaryStats) {
    println!("\n--- {kind} ---");
    println!("Trials: {}", stats.total);
    println!("Successes: {}", stats.successes);
    println!("Valid responses: {}", stats.valid);
    if let Some(mean) = stats.mean_secs {
        println!("Mean latency: {:.2}s", mean);
    }
}
