//! The subject a prediction is generated for
//!
//! Prompts are personalized with birth data and pre-calculated astrology
//! facts. The built-in subject keeps trial runs reproducible; a YAML file
//! swaps in a different one.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectProfile {
    pub user_id: String,
    pub full_name: String,
    pub first_name: String,
    pub gender: String,
    pub birth_date: String,
    pub birth_time: String,
    pub birth_city: String,
    pub lat_long: String,
    pub sun_sign: String,
    pub moon_sign: String,
    pub rising_sign: String,
    pub birth_year_zodiac: String,
    pub birth_year_animal: String,
    pub birth_year_element: String,
    pub current_age: u32,
}

impl Default for SubjectProfile {
    fn default() -> Self {
        Self {
            user_id: "test_user_123".to_string(),
            full_name: "James Chen".to_string(),
            first_name: "James".to_string(),
            gender: "Male".to_string(),
            birth_date: "1990-03-21".to_string(),
            birth_time: "14:30:00".to_string(),
            birth_city: "Los Angeles, USA".to_string(),
            lat_long: "34.0522, -118.2437".to_string(),
            sun_sign: "Aries".to_string(),
            moon_sign: "Taurus".to_string(),
            rising_sign: "Gemini".to_string(),
            birth_year_zodiac: "Metal Horse (庚午)".to_string(),
            birth_year_animal: "Horse".to_string(),
            birth_year_element: "Metal".to_string(),
            current_age: 34,
        }
    }
}

impl SubjectProfile {
    /// Load a subject from a YAML file; keys are camelCase, missing keys
    /// fall back to the built-in subject's values
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid profile {}", path.display()))
    }

    /// One-line identity used in prompts
    pub fn summary(&self) -> String {
        format!("{} {} {}", self.first_name, self.gender, self.birth_date)
    }

    /// Western zodiac element for the subject's sun sign
    pub fn zodiac_element(&self) -> &'static str {
        match self.sun_sign.as_str() {
            "Aries" | "Leo" | "Sagittarius" => "Fire",
            "Taurus" | "Virgo" | "Capricorn" => "Earth",
            "Gemini" | "Libra" | "Aquarius" => "Air",
            "Cancer" | "Scorpio" | "Pisces" => "Water",
            _ => "Fire",
        }
    }
}
