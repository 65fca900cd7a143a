//! Per-prediction-type field schemas
//!
//! A schema names the required fields for one prediction type, plus the
//! fields whose values are pipe-delimited arrays and the fields that must
//! hold a bounded integer score. The three service types are built in;
//! custom schemas load from YAML.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{ProbeError, Result};

/// The kinds of prediction the service produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionType {
    Daily,
    Yearly,
    Lifetime,
}

impl PredictionType {
    pub const ALL: [PredictionType; 3] = [
        PredictionType::Daily,
        PredictionType::Yearly,
        PredictionType::Lifetime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionType::Daily => "daily",
            PredictionType::Yearly => "yearly",
            PredictionType::Lifetime => "lifetime",
        }
    }
}

impl fmt::Display for PredictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredictionType {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(PredictionType::Daily),
            "yearly" => Ok(PredictionType::Yearly),
            "lifetime" => Ok(PredictionType::Lifetime),
            other => Err(ProbeError::UnknownPredictionType(other.to_string())),
        }
    }
}

/// A field whose value is a `|`-delimited list.
///
/// `expected: Some(n)` pins the item count; `None` leaves the count
/// unchecked. Items must be non-empty either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayRule {
    pub field: String,
    pub expected: Option<usize>,
}

impl ArrayRule {
    pub fn exactly(field: impl Into<String>, expected: usize) -> Self {
        Self {
            field: field.into(),
            expected: Some(expected),
        }
    }

    pub fn any_length(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: None,
        }
    }
}

/// A field whose value must parse as an integer within an inclusive range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRule {
    pub field: String,
    pub min: i64,
    pub max: i64,
}

impl ScoreRule {
    pub fn new(field: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            field: field.into(),
            min,
            max,
        }
    }
}

/// The validation contract for one prediction type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub kind: PredictionType,
    /// Required field names, in reporting order
    pub required: Vec<String>,
    #[serde(default)]
    pub arrays: Vec<ArrayRule>,
    #[serde(default)]
    pub scores: Vec<ScoreRule>,
    /// Fields where a present-but-empty value is a violation
    #[serde(default)]
    pub non_empty: Vec<String>,
}

const DAILY_REQUIRED: [&str; 26] = [
    "dayTitle",
    "card_name",
    "card_essence",
    "card_orient",
    "path_title",
    "path_intro",
    "path_detail",
    "career",
    "love",
    "prosperity",
    "wellness",
    "takeaway",
    "lucky_num",
    "lucky_digit",
    "num_meaning",
    "num_calc",
    "stone",
    "stone_power",
    "stone_use",
    "spell",
    "spell_words",
    "spell_intent",
    "fortune_title",
    "fortune_do",
    "fortune_avoid",
    "fortune_tip",
];

const LIFETIME_REQUIRED: [&str; 7] = [
    "pillars_id",
    "pillars_detail",
    "cn_year",
    "sun_tag",
    "sun_arch",
    "sun_desc",
    "moon_sign",
];

const YEARLY_AREAS: [&str; 4] = ["career", "love", "prosperity", "wellness"];

impl Schema {
    /// The built-in schema for a prediction type
    pub fn builtin(kind: PredictionType) -> Self {
        match kind {
            PredictionType::Daily => Self::daily(),
            PredictionType::Yearly => Self::yearly(),
            PredictionType::Lifetime => Self::lifetime(),
        }
    }

    /// Daily prediction: 26 fields, two 5-item fortune arrays, and a
    /// 1-9 lucky digit
    pub fn daily() -> Self {
        Schema {
            kind: PredictionType::Daily,
            required: DAILY_REQUIRED.iter().map(|s| s.to_string()).collect(),
            arrays: vec![
                ArrayRule::exactly("fortune_do", 5),
                ArrayRule::exactly("fortune_avoid", 5),
            ],
            scores: vec![ScoreRule::new("lucky_digit", 1, 9)],
            non_empty: Vec::new(),
        }
    }

    /// Yearly prediction: four theme fields, five fields per life area,
    /// and a mantra. Area scores are 1-5; the do/avoid lists have no
    /// pinned length.
    pub fn yearly() -> Self {
        let mut required: Vec<String> = ["astro_overlay", "theme_title", "theme_glance", "theme_detail"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut arrays = Vec::new();
        let mut scores = Vec::new();

        for area in YEARLY_AREAS {
            required.push(format!("{area}_score"));
            required.push(format!("{area}_tag"));
            required.push(format!("{area}_do"));
            required.push(format!("{area}_avoid"));
            required.push(format!("{area}_detail"));
            scores.push(ScoreRule::new(format!("{area}_score"), 1, 5));
            arrays.push(ArrayRule::any_length(format!("{area}_do")));
            arrays.push(ArrayRule::any_length(format!("{area}_avoid")));
        }
        required.push("mantra".to_string());

        Schema {
            kind: PredictionType::Yearly,
            required,
            arrays,
            scores,
            non_empty: Vec::new(),
        }
    }

    /// Lifetime profile: the seven core identity fields
    pub fn lifetime() -> Self {
        Schema {
            kind: PredictionType::Lifetime,
            required: LIFETIME_REQUIRED.iter().map(|s| s.to_string()).collect(),
            arrays: Vec::new(),
            scores: Vec::new(),
            non_empty: Vec::new(),
        }
    }

    /// Load a custom schema from a YAML file
    #[tracing::instrument(skip(path), fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let schema: Schema =
            serde_yaml::from_str(&text).map_err(|e| ProbeError::invalid_schema(path, e))?;

        let mut seen = HashSet::new();
        for field in &schema.required {
            if !seen.insert(field.as_str()) {
                return Err(ProbeError::invalid_schema(
                    path,
                    format!("required field listed twice: {field}"),
                ));
            }
        }
        tracing::debug!(
            kind = %schema.kind,
            required = schema.required.len(),
            arrays = schema.arrays.len(),
            scores = schema.scores.len(),
            "Loaded custom schema"
        );
        Ok(schema)
    }
}
