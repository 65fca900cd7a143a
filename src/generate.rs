//! Content source abstraction for the trial runner
//!
//! The runner only needs "give me one response"; where that response comes
//! from (live chat-completion call, canned file) is behind [`Generator`].

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use lumen_probe_core::trial::{GenerationFailure, GenerationOutput};

#[async_trait]
pub trait Generator {
    /// Produce one raw response body
    async fn generate(&mut self) -> Result<GenerationOutput, GenerationFailure>;

    /// Human-readable source label for headers and logs
    fn describe(&self) -> String;
}

/// Replays a canned response from disk instead of calling the API
///
/// Every trial gets the same content, so replay runs exercise the parse,
/// validate, and analyze stages deterministically.
pub struct ReplayGenerator {
    path: PathBuf,
    content: String,
}

impl ReplayGenerator {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }
}

#[async_trait]
impl Generator for ReplayGenerator {
    async fn generate(&mut self) -> Result<GenerationOutput, GenerationFailure> {
        Ok(GenerationOutput {
            content: self.content.clone(),
            usage: None,
        })
    }

    fn describe(&self) -> String {
        format!("replay of {}", self.path.display())
    }
}
