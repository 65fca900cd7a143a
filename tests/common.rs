use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::path::Path;

use lumen_probe_core::schema::Schema;

pub fn probe() -> Command {
    cargo_bin_cmd!("lumen-probe")
}

/// Build a response that satisfies every rule of the given schema
pub fn sample_response(schema: &Schema) -> String {
    let mut lines = Vec::new();
    for field in &schema.required {
        let value = if let Some(rule) = schema.arrays.iter().find(|r| r.field == *field) {
            let count = rule.expected.unwrap_or(2);
            (1..=count)
                .map(|i| format!("Sample item {i}"))
                .collect::<Vec<_>>()
                .join("|")
        } else if let Some(rule) = schema.scores.iter().find(|r| r.field == *field) {
            ((rule.min + rule.max) / 2).to_string()
        } else {
            format!("Sample value text for {field}")
        };
        lines.push(format!("{field}\t{value}"));
    }
    lines.push(String::new());
    lines.join("\n")
}

#[allow(dead_code)]
pub fn write_response(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
