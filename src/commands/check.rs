//! `lumen-probe check` command - validate a saved response file

use anyhow::Context;

use crate::cli::CheckArgs;
use crate::config::Config;
use crate::output;
use lumen_probe_core::quality;
use lumen_probe_core::schema::Schema;
use lumen_probe_core::tabular::{self, DuplicatePolicy};
use lumen_probe_core::validate;

pub fn execute(config: &Config, args: &CheckArgs, quiet: bool) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let schema = match &args.schema {
        Some(path) => Schema::load(path)?,
        None => Schema::builtin(args.prediction),
    };
    let policy = if args.last_wins {
        DuplicatePolicy::LastWins
    } else {
        DuplicatePolicy::FirstWins
    };

    let parsed = tabular::parse(&text, policy);
    let validation = validate::validate(&schema, &parsed.fields);
    let analyzer = config.quality.analyzer();
    let quality = quality::analyze(&parsed.fields, args.language, &analyzer);

    if !quiet {
        println!("File: {}", args.file.display());
        output::print_parse_outcome(parsed.fields.len(), &parsed.errors);
        output::print_validation(&validation);
        output::print_quality(&quality);
    }

    if !validation.valid {
        anyhow::bail!("response does not satisfy the {} schema", args.prediction);
    }
    Ok(())
}
