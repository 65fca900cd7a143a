//! Content quality analysis for generated predictions
//!
//! Three checks run over a parsed response: a refusal-phrase scan, an
//! empty-field scan, and a language-mixing heuristic for non-Latin target
//! languages. The language check counts ASCII letters against Han
//! characters per field; it is a tripwire for obviously mixed output, not
//! a language detector, and is tuned to tolerate loanwords and names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ProbeError;
use crate::tabular::FieldMap;

/// Languages the service can be asked to respond in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh")]
    SimplifiedChinese,
    #[serde(rename = "zh-tw")]
    TraditionalChinese,
    #[serde(rename = "es")]
    Spanish,
}

impl Language {
    pub const ALL: [Language; 4] = [
        Language::English,
        Language::SimplifiedChinese,
        Language::TraditionalChinese,
        Language::Spanish,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::SimplifiedChinese => "zh",
            Language::TraditionalChinese => "zh-tw",
            Language::Spanish => "es",
        }
    }

    /// The name used when instructing the model
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::SimplifiedChinese => "简体中文",
            Language::TraditionalChinese => "繁體中文",
            Language::Spanish => "Español",
        }
    }

    /// Whether responses in this language are written in Han characters.
    /// Only then is the ASCII-letter count a useful mixing signal.
    pub fn uses_han_script(&self) -> bool {
        matches!(self, Language::SimplifiedChinese | Language::TraditionalChinese)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, ProbeError> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Language::English),
            "zh" => Ok(Language::SimplifiedChinese),
            "zh-tw" => Ok(Language::TraditionalChinese),
            "es" => Ok(Language::Spanish),
            other => Err(ProbeError::UnknownLanguage(other.to_string())),
        }
    }
}

/// Refusal phrases grouped by language code, matched case-insensitively
/// as substrings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefusalLexicon {
    by_language: BTreeMap<String, Vec<String>>,
}

impl Default for RefusalLexicon {
    fn default() -> Self {
        let mut by_language = BTreeMap::new();
        by_language.insert(
            "en".to_string(),
            ["sorry", "cannot", "can't", "unable", "refuse"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        by_language.insert(
            "zh".to_string(),
            ["抱歉", "无法", "不能", "拒绝"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        Self { by_language }
    }
}

impl RefusalLexicon {
    /// Add phrases for a language, creating the group if needed
    pub fn extend(&mut self, language: &str, phrases: impl IntoIterator<Item = String>) {
        self.by_language
            .entry(language.to_string())
            .or_default()
            .extend(phrases);
    }

    /// Number of languages with at least one phrase
    pub fn language_count(&self) -> usize {
        self.by_language.values().filter(|p| !p.is_empty()).count()
    }

    /// All phrases across every language
    pub fn phrases(&self) -> impl Iterator<Item = &str> {
        self.by_language
            .values()
            .flat_map(|phrases| phrases.iter().map(|p| p.as_str()))
    }
}

/// Keys of the service's metadata envelope, not model-generated content
const DEFAULT_EXCLUDED_KEYS: [&str; 8] = [
    "predictionId",
    "generatedAt",
    "predictionDate",
    "userId",
    "type",
    "availableLanguages",
    "requestedLanguage",
    "returnedLanguage",
];

/// Fields that legitimately stay Latin even in Chinese output
const DEFAULT_EXEMPT_FIELDS: [&str; 2] = ["lucky_digit", "card_orient"];

pub const DEFAULT_ASCII_THRESHOLD: usize = 10;
pub const DEFAULT_MIXING_TOLERANCE: usize = 3;
pub const DEFAULT_SNIPPET_CHARS: usize = 100;

/// Tunable knobs for the analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub lexicon: RefusalLexicon,
    /// Keys skipped by every scan
    pub excluded_keys: Vec<String>,
    /// Fields skipped by the language check only
    pub exempt_fields: Vec<String>,
    /// ASCII letters per field above which the field counts as
    /// foreign-heavy
    pub ascii_threshold: usize,
    /// Foreign-heavy fields tolerated before the verdict turns to Warning
    pub mixing_tolerance: usize,
    /// Characters of field value kept in a refusal snippet
    pub snippet_chars: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            lexicon: RefusalLexicon::default(),
            excluded_keys: DEFAULT_EXCLUDED_KEYS.iter().map(|s| s.to_string()).collect(),
            exempt_fields: DEFAULT_EXEMPT_FIELDS.iter().map(|s| s.to_string()).collect(),
            ascii_threshold: DEFAULT_ASCII_THRESHOLD,
            mixing_tolerance: DEFAULT_MIXING_TOLERANCE,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }
}

/// One refusal phrase found in one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefusalHit {
    pub field: String,
    pub phrase: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageVerdict {
    Good,
    Warning,
}

/// Outcome of the language-mixing check for a Han-script target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageSummary {
    pub target: Language,
    /// Fields with at least one Han character, foreign-heavy ones excluded
    pub consistent: usize,
    /// Fields whose ASCII letter count exceeded the threshold
    pub foreign_heavy: Vec<String>,
    pub verdict: LanguageVerdict,
}

/// What the analyzer found in one response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Fields examined after exclusions
    pub analyzed: usize,
    pub refusals: Vec<RefusalHit>,
    pub empty_fields: Vec<String>,
    /// Present only when the target language uses Han script
    pub language: Option<LanguageSummary>,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        self.refusals.is_empty()
            && self.empty_fields.is_empty()
            && !matches!(
                self.language,
                Some(LanguageSummary {
                    verdict: LanguageVerdict::Warning,
                    ..
                })
            )
    }
}

/// Scan a parsed response for refusals, empty fields, and language mixing.
///
/// Excluded keys are invisible to all three scans. An empty field is
/// reported once and skipped by the other scans. The language check only
/// runs when `target` uses Han script; for Latin-script targets the
/// report's `language` is `None`.
pub fn analyze(fields: &FieldMap, target: Option<Language>, cfg: &AnalyzerConfig) -> QualityReport {
    let han_target = target.filter(|l| l.uses_han_script());

    let mut analyzed = 0;
    let mut refusals = Vec::new();
    let mut empty_fields = Vec::new();
    let mut consistent = 0;
    let mut foreign_heavy = Vec::new();

    for (key, value) in fields.iter() {
        if cfg.excluded_keys.iter().any(|k| k == key) {
            continue;
        }
        analyzed += 1;

        if value.trim().is_empty() {
            empty_fields.push(key.to_string());
            continue;
        }

        let lowered = value.to_lowercase();
        for phrase in cfg.lexicon.phrases() {
            if lowered.contains(&phrase.to_lowercase()) {
                refusals.push(RefusalHit {
                    field: key.to_string(),
                    phrase: phrase.to_string(),
                    snippet: value.chars().take(cfg.snippet_chars).collect(),
                });
            }
        }

        if han_target.is_some() && !cfg.exempt_fields.iter().any(|f| f == key) {
            let ascii_letters = value.chars().filter(char::is_ascii_alphabetic).count();
            let han_chars = value
                .chars()
                .filter(|c| matches!(c, '\u{4e00}'..='\u{9fff}'))
                .count();
            if ascii_letters > cfg.ascii_threshold {
                foreign_heavy.push(key.to_string());
            } else if han_chars > 0 {
                consistent += 1;
            }
        }
    }

    let language = han_target.map(|target| {
        let verdict = if foreign_heavy.len() <= cfg.mixing_tolerance {
            LanguageVerdict::Good
        } else {
            LanguageVerdict::Warning
        };
        LanguageSummary {
            target,
            consistent,
            foreign_heavy,
            verdict,
        }
    });

    QualityReport {
        analyzed,
        refusals,
        empty_fields,
        language,
    }
}
