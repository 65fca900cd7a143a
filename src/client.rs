//! Chat-completion client for live runs
//!
//! Speaks the OpenAI-compatible `/v1/chat/completions` shape the proxy
//! exposes. Request errors are classified into [`GenerationFailure`]
//! variants so the runner can record why a trial produced nothing.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use crate::config::ApiConfig;
use crate::generate::Generator;
use crate::prompt::Prompt;
use lumen_probe_core::trial::{GenerationFailure, GenerationOutput, TokenUsage};

const ERROR_BODY_CHARS: usize = 200;

pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f64,
    max_tokens: u32,
    timeout_secs: f64,
    prompt: Prompt,
}

impl HttpGenerator {
    /// Resolves the API key from the configured environment variable and
    /// builds a client with the request timeout baked in.
    pub fn new(cfg: &ApiConfig, prompt: Prompt) -> anyhow::Result<Self> {
        let api_key = std::env::var(&cfg.key_env)
            .with_context(|| format!("{} environment variable must be set", cfg.key_env))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs_f64(cfg.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/v1/chat/completions", cfg.base_url.trim_end_matches('/')),
            model: cfg.model.clone(),
            api_key,
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
            timeout_secs: cfg.timeout_secs,
            prompt,
        })
    }

    fn request_body(&self) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": self.prompt.system },
                { "role": "user", "content": self.prompt.user }
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        })
    }

    fn classify_request_error(&self, err: reqwest::Error) -> GenerationFailure {
        if err.is_timeout() {
            GenerationFailure::Timeout {
                limit_secs: self.timeout_secs,
            }
        } else {
            GenerationFailure::Transport {
                message: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn generate(&mut self) -> Result<GenerationOutput, GenerationFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.request_body())
            .send()
            .await
            .map_err(|e| self.classify_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationFailure::Status {
                code: status.as_u16(),
                message: excerpt(&body),
            });
        }

        let body: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| GenerationFailure::Malformed {
                    message: format!("response body is not JSON: {e}"),
                })?;

        let content = body
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| GenerationFailure::Malformed {
                message: "no message content in first choice".to_string(),
            })?;

        Ok(GenerationOutput {
            content: content.to_string(),
            usage: parse_usage(&body),
        })
    }

    fn describe(&self) -> String {
        format!("{} via {}", self.model, self.endpoint)
    }
}

fn parse_usage(body: &serde_json::Value) -> Option<TokenUsage> {
    let usage = body.get("usage")?;
    let count = |key: &str| usage.get(key).and_then(|v| v.as_u64()).unwrap_or(0);
    Some(TokenUsage {
        prompt_tokens: count("prompt_tokens"),
        completion_tokens: count("completion_tokens"),
        total_tokens: count("total_tokens"),
        cached_tokens: usage
            .pointer("/prompt_tokens_details/cached_tokens")
            .and_then(|v| v.as_u64()),
    })
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= ERROR_BODY_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(ERROR_BODY_CHARS).collect();
    format!("{cut}...")
}
