//! TOML configuration with per-section defaults
//!
//! Every key is optional; a missing file means an all-default config. CLI
//! flags override whatever the file says.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lumen_probe_core::quality::AnalyzerConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub run: RunConfig,
    pub quality: QualityConfig,
}

/// Connection settings for the chat-completions backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub key_env: String,
    pub timeout_secs: f64,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hyperecho-proxy.aelf.dev".to_string(),
            model: "fortune-telling-testnet".to_string(),
            key_env: "LUMEN_API_KEY".to_string(),
            timeout_secs: 60.0,
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub trials: usize,
    pub delay_secs: f64,
    pub results_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            trials: 3,
            delay_secs: 2.0,
            results_dir: PathBuf::from("results"),
        }
    }
}

/// Analyzer tuning. Key lists replace the defaults when set; refusal
/// phrases extend the built-in lexicon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub ascii_threshold: usize,
    pub mixing_tolerance: usize,
    pub snippet_chars: usize,
    pub exclude_keys: Vec<String>,
    pub exempt_fields: Vec<String>,
    /// Extra refusal phrases, grouped by language code
    pub refusal_phrases: BTreeMap<String, Vec<String>>,
}

impl Default for QualityConfig {
    fn default() -> Self {
        let base = AnalyzerConfig::default();
        Self {
            ascii_threshold: base.ascii_threshold,
            mixing_tolerance: base.mixing_tolerance,
            snippet_chars: base.snippet_chars,
            exclude_keys: base.excluded_keys,
            exempt_fields: base.exempt_fields,
            refusal_phrases: BTreeMap::new(),
        }
    }
}

impl QualityConfig {
    /// Build the analyzer configuration this section describes
    pub fn analyzer(&self) -> AnalyzerConfig {
        let mut cfg = AnalyzerConfig {
            ascii_threshold: self.ascii_threshold,
            mixing_tolerance: self.mixing_tolerance,
            snippet_chars: self.snippet_chars,
            excluded_keys: self.exclude_keys.clone(),
            exempt_fields: self.exempt_fields.clone(),
            ..AnalyzerConfig::default()
        };
        for (language, phrases) in &self.refusal_phrases {
            cfg.lexicon.extend(language, phrases.iter().cloned());
        }
        cfg
    }
}

impl Config {
    /// Load the config file if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config not found, using defaults");
            return Ok(Config::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_service_contract() {
        let config = Config::default();
        assert_eq!(config.api.model, "fortune-telling-testnet");
        assert_eq!(config.api.key_env, "LUMEN_API_KEY");
        assert_eq!(config.api.timeout_secs, 60.0);
        assert_eq!(config.api.max_tokens, 4000);
        assert_eq!(config.run.trials, 3);
        assert_eq!(config.run.delay_secs, 2.0);
        assert_eq!(config.quality.ascii_threshold, 10);
        assert_eq!(config.quality.mixing_tolerance, 3);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = Config::load_or_default(Path::new("/nonexistent/lumen-probe.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_unnamed_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nmodel = \"other-model\"\n\n[run]\ntrials = 10"
        )
        .unwrap();

        let config = Config::load_or_default(file.path()).unwrap();
        assert_eq!(config.api.model, "other-model");
        assert_eq!(config.api.base_url, ApiConfig::default().base_url);
        assert_eq!(config.run.trials, 10);
        assert_eq!(config.run.delay_secs, 2.0);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nmodel =").unwrap();
        assert!(Config::load_or_default(file.path()).is_err());
    }

    #[test]
    fn analyzer_extends_the_default_lexicon() {
        let mut quality = QualityConfig::default();
        quality
            .refusal_phrases
            .insert("es".to_string(), vec!["no puedo".to_string()]);
        let analyzer = quality.analyzer();
        assert!(analyzer.lexicon.phrases().any(|p| p == "no puedo"));
        assert!(analyzer.lexicon.phrases().any(|p| p == "sorry"));
    }

    #[test]
    fn analyzer_carries_the_tuned_thresholds() {
        let quality = QualityConfig {
            ascii_threshold: 20,
            mixing_tolerance: 0,
            ..QualityConfig::default()
        };
        let analyzer = quality.analyzer();
        assert_eq!(analyzer.ascii_threshold, 20);
        assert_eq!(analyzer.mixing_tolerance, 0);
    }
}
