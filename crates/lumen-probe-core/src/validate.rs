//! Structural validation of a parsed response against a schema

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::{PredictionType, Schema};
use crate::tabular::FieldMap;

/// A schema rule a present field failed to meet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Violation {
    ArrayLength {
        field: String,
        expected: usize,
        actual: usize,
    },
    EmptyArrayItem {
        field: String,
        index: usize,
    },
    ScoreNotInteger {
        field: String,
        value: String,
    },
    ScoreOutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },
    EmptyField {
        field: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::ArrayLength {
                field,
                expected,
                actual,
            } => write!(f, "{field}: expected {expected} items, found {actual}"),
            Violation::EmptyArrayItem { field, index } => {
                write!(f, "{field}: empty item at position {index}")
            }
            Violation::ScoreNotInteger { field, value } => {
                write!(f, "{field}: not an integer: '{value}'")
            }
            Violation::ScoreOutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field}: score {value} outside {min}-{max}"),
            Violation::EmptyField { field } => write!(f, "{field}: empty value"),
        }
    }
}

/// The verdict for one response against one schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub kind: PredictionType,
    pub valid: bool,
    /// Required fields absent from the response, in schema order
    pub missing: Vec<String>,
    pub violations: Vec<Violation>,
}

/// Check a field map against a schema.
///
/// Array and score rules only apply to fields that are present; absence is
/// already covered by the missing list. Fields the schema does not name
/// pass through without comment. The check itself never fails.
pub fn validate(schema: &Schema, fields: &FieldMap) -> ValidationResult {
    let missing: Vec<String> = schema
        .required
        .iter()
        .filter(|field| !fields.contains_key(field))
        .cloned()
        .collect();

    let mut violations = Vec::new();

    for rule in &schema.arrays {
        let Some(value) = fields.get(&rule.field) else {
            continue;
        };
        let items: Vec<&str> = value.split('|').map(str::trim).collect();
        if let Some(expected) = rule.expected {
            if items.len() != expected {
                violations.push(Violation::ArrayLength {
                    field: rule.field.clone(),
                    expected,
                    actual: items.len(),
                });
            }
        }
        for (index, item) in items.iter().enumerate() {
            if item.is_empty() {
                violations.push(Violation::EmptyArrayItem {
                    field: rule.field.clone(),
                    index,
                });
            }
        }
    }

    for rule in &schema.scores {
        let Some(value) = fields.get(&rule.field) else {
            continue;
        };
        match value.trim().parse::<i64>() {
            Ok(score) if score >= rule.min && score <= rule.max => {}
            Ok(score) => violations.push(Violation::ScoreOutOfRange {
                field: rule.field.clone(),
                value: score,
                min: rule.min,
                max: rule.max,
            }),
            Err(_) => violations.push(Violation::ScoreNotInteger {
                field: rule.field.clone(),
                value: value.to_string(),
            }),
        }
    }

    for field in &schema.non_empty {
        if let Some(value) = fields.get(field) {
            if value.trim().is_empty() {
                violations.push(Violation::EmptyField {
                    field: field.clone(),
                });
            }
        }
    }

    let valid = missing.is_empty() && violations.is_empty();
    ValidationResult {
        kind: schema.kind,
        valid,
        missing,
        violations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a map holding every required field of `schema`, with
    /// overridden or skipped entries as requested.
    fn fixture(schema: &Schema, overrides: &[(&str, &str)], skip: &[&str]) -> FieldMap {
        let mut map = FieldMap::new();
        for field in &schema.required {
            if skip.contains(&field.as_str()) {
                continue;
            }
            let value = overrides
                .iter()
                .find(|(k, _)| *k == field.as_str())
                .map(|(_, v)| *v)
                .unwrap_or(match field.as_str() {
                    "fortune_do" => "Meditate|Walk|Read|Journal|Rest",
                    "fortune_avoid" => "Rushing|Gossip|Overwork|Clutter|Doubt",
                    "lucky_digit" => "8",
                    f if f.ends_with("_score") => "4",
                    f if f.ends_with("_do") || f.ends_with("_avoid") => "Plan early|Stay open",
                    _ => "a steady reading",
                });
            map.insert(field.clone(), value);
        }
        map
    }

    #[test]
    fn complete_daily_response_is_valid() {
        let schema = Schema::daily();
        let result = validate(&schema, &fixture(&schema, &[], &[]));
        assert!(result.valid);
        assert!(result.missing.is_empty());
        assert!(result.violations.is_empty());
        assert_eq!(result.kind, PredictionType::Daily);
    }

    #[test]
    fn complete_yearly_response_is_valid() {
        let schema = Schema::yearly();
        assert!(validate(&schema, &fixture(&schema, &[], &[])).valid);
    }

    #[test]
    fn complete_lifetime_response_is_valid() {
        let schema = Schema::lifetime();
        assert!(validate(&schema, &fixture(&schema, &[], &[])).valid);
    }

    #[test]
    fn missing_fields_reported_in_schema_order() {
        let schema = Schema::daily();
        let map = fixture(&schema, &[], &["path_title", "card_essence"]);
        let result = validate(&schema, &map);
        assert!(!result.valid);
        // card_essence is declared before path_title
        assert_eq!(result.missing, vec!["card_essence", "path_title"]);
    }

    #[test]
    fn empty_map_reports_every_required_field() {
        let schema = Schema::daily();
        let result = validate(&schema, &FieldMap::new());
        assert_eq!(result.missing.len(), 26);
        assert!(result.violations.is_empty());
        assert!(!result.valid);
    }

    #[test]
    fn short_fortune_array_is_a_violation() {
        let schema = Schema::daily();
        let map = fixture(&schema, &[("fortune_do", "Walk|Read|Rest")], &[]);
        let result = validate(&schema, &map);
        assert_eq!(
            result.violations,
            vec![Violation::ArrayLength {
                field: "fortune_do".to_string(),
                expected: 5,
                actual: 3,
            }]
        );
    }

    #[test]
    fn empty_array_item_carries_its_index() {
        let schema = Schema::daily();
        let map = fixture(&schema, &[("fortune_avoid", "Rushing||Overwork|Clutter|Doubt")], &[]);
        let result = validate(&schema, &map);
        assert!(result
            .violations
            .contains(&Violation::EmptyArrayItem {
                field: "fortune_avoid".to_string(),
                index: 1,
            }));
    }

    #[test]
    fn array_items_are_trimmed_before_checks() {
        let schema = Schema::daily();
        let map = fixture(&schema, &[("fortune_do", " a | b | c | d | e ")], &[]);
        assert!(validate(&schema, &map).valid);
    }

    #[test]
    fn unchecked_array_length_still_rejects_empty_items() {
        let schema = Schema::yearly();
        let ok = fixture(&schema, &[("career_do", "One|Two|Three|Four|Five|Six")], &[]);
        assert!(validate(&schema, &ok).valid);

        let bad = fixture(&schema, &[("career_do", "One|")], &[]);
        let result = validate(&schema, &bad);
        assert_eq!(
            result.violations,
            vec![Violation::EmptyArrayItem {
                field: "career_do".to_string(),
                index: 1,
            }]
        );
    }

    #[test]
    fn integer_score_outside_range_is_a_violation() {
        let schema = Schema::yearly();
        let map = fixture(&schema, &[("love_score", "7")], &[]);
        let result = validate(&schema, &map);
        assert_eq!(
            result.violations,
            vec![Violation::ScoreOutOfRange {
                field: "love_score".to_string(),
                value: 7,
                min: 1,
                max: 5,
            }]
        );
    }

    #[test]
    fn score_bounds_are_inclusive() {
        let schema = Schema::yearly();
        for bound in ["1", "5"] {
            let map = fixture(&schema, &[("wellness_score", bound)], &[]);
            assert!(validate(&schema, &map).valid, "score {bound} should pass");
        }
    }

    #[test]
    fn non_integer_score_is_a_violation() {
        let schema = Schema::yearly();
        for value in ["3.5", "three", ""] {
            let map = fixture(&schema, &[("career_score", value)], &[]);
            let result = validate(&schema, &map);
            assert_eq!(
                result.violations,
                vec![Violation::ScoreNotInteger {
                    field: "career_score".to_string(),
                    value: value.to_string(),
                }],
                "value {value:?}"
            );
        }
    }

    #[test]
    fn score_values_are_trimmed_before_parsing() {
        let schema = Schema::yearly();
        let map = fixture(&schema, &[("prosperity_score", " 3 ")], &[]);
        assert!(validate(&schema, &map).valid);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let schema = Schema::lifetime();
        let mut map = fixture(&schema, &[], &[]);
        map.insert("unexpected", "whatever");
        assert!(validate(&schema, &map).valid);
    }

    #[test]
    fn non_empty_fields_reject_blank_values() {
        let mut schema = Schema::lifetime();
        schema.non_empty = vec!["sun_desc".to_string()];
        let map = fixture(&schema, &[("sun_desc", "   ")], &[]);
        let result = validate(&schema, &map);
        assert_eq!(
            result.violations,
            vec![Violation::EmptyField {
                field: "sun_desc".to_string(),
            }]
        );
    }

    #[test]
    fn missing_array_field_is_only_reported_as_missing() {
        let schema = Schema::daily();
        let map = fixture(&schema, &[], &["fortune_do"]);
        let result = validate(&schema, &map);
        assert_eq!(result.missing, vec!["fortune_do"]);
        assert!(result.violations.is_empty());
    }

    #[test]
    fn violation_messages_name_the_field() {
        let violation = Violation::ScoreOutOfRange {
            field: "love_score".to_string(),
            value: 9,
            min: 1,
            max: 5,
        };
        assert_eq!(violation.to_string(), "love_score: score 9 outside 1-5");
    }
}
