//! Tolerant parser for tab-separated prediction output
//!
//! The service is expected to return one `key<TAB>value` pair per line.
//! Models drift from that contract in predictable ways (markdown fences,
//! JSON payloads, missing or doubled tabs), so the parser classifies every
//! malformed line instead of failing, and still extracts whatever
//! well-formed pairs the response contains.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum characters of the offending line kept in a diagnostic
const SNIPPET_CHARS: usize = 50;

/// An insertion-ordered map of response fields with unique keys.
///
/// Responses carry a few dozen fields, so lookups are linear scans over a
/// `Vec` rather than a hash map. Iteration order always matches the order
/// keys first appeared in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// Look up a field value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.position(key).map(|i| self.entries[i].1.as_str())
    }

    /// Insert a new key/value pair. Returns false and leaves the map
    /// unchanged if the key is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.contains_key(&key) {
            return false;
        }
        self.entries.push((key, value.into()));
        true
    }

    /// Iterate over keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Iterate over `(key, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

/// Classification of a line the parser could not turn into a field
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    #[error("markdown formatting found")]
    MarkdownFence,
    #[error("JSON-like content found")]
    JsonLike,
    #[error("no tab separator found")]
    MissingSeparator,
    #[error("multiple tab separators found")]
    MultipleSeparators,
    #[error("empty key")]
    EmptyKey,
    #[error("duplicate key")]
    DuplicateKey,
}

/// A single malformed line, with its 1-based line number and a truncated
/// prefix of the offending text
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("line {line}: {kind}: {snippet}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
    pub snippet: String,
}

/// What a repeated key keeps: the value seen first, or the value seen last.
/// Either way the repeat is reported as a [`ParseErrorKind::DuplicateKey`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    #[default]
    FirstWins,
    LastWins,
}

/// The fields extracted from a response together with every line-level
/// problem found along the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub fields: FieldMap,
    pub errors: Vec<ParseError>,
}

/// Parse tab-separated `key<TAB>value` lines into an ordered field map.
///
/// Parsing is total: malformed lines are classified and skipped, blank
/// lines are ignored, and later lines always get a chance to parse. Line
/// numbers in the reported errors are 1-based and count every input line,
/// blanks included.
pub fn parse(input: &str, policy: DuplicatePolicy) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for (idx, raw) in input.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with("```") {
            outcome.push_error(line, ParseErrorKind::MarkdownFence, raw);
            continue;
        }
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            outcome.push_error(line, ParseErrorKind::JsonLike, raw);
            continue;
        }

        let parts: Vec<&str> = raw.split('\t').collect();
        match parts.len() {
            0 | 1 => {
                outcome.push_error(line, ParseErrorKind::MissingSeparator, raw);
                continue;
            }
            2 => {}
            _ => {
                outcome.push_error(line, ParseErrorKind::MultipleSeparators, raw);
                continue;
            }
        }

        let key = parts[0].trim();
        let value = parts[1].trim();
        if key.is_empty() {
            outcome.push_error(line, ParseErrorKind::EmptyKey, raw);
            continue;
        }

        match outcome.fields.position(key) {
            None => {
                outcome.fields.entries.push((key.to_string(), value.to_string()));
            }
            Some(existing) => {
                outcome.push_error(line, ParseErrorKind::DuplicateKey, raw);
                if policy == DuplicatePolicy::LastWins {
                    outcome.fields.entries[existing].1 = value.to_string();
                }
            }
        }
    }

    tracing::debug!(
        fields = outcome.fields.len(),
        errors = outcome.errors.len(),
        "Parsed tabular response"
    );
    outcome
}

impl ParseOutcome {
    fn push_error(&mut self, line: usize, kind: ParseErrorKind, raw: &str) {
        self.errors.push(ParseError {
            line,
            kind,
            snippet: snippet_of(raw),
        });
    }
}

fn snippet_of(raw: &str) -> String {
    raw.chars().take(SNIPPET_CHARS).collect()
}
