//! Configuration types for Scribe.
//!
//! `ScribeConfig` mirrors the optional `config.toml`; every field has a
//! default so an empty file (or no file) is a valid configuration. Provider
//! credentials and dynamic model lists are usually supplied through the
//! environment and merged on top by the infra loader.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::llm::DynamicModelSpec;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScribeConfig {
    #[serde(default)]
    pub providers: ProviderSettings,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
}

/// Credentials and endpoints for every provider family.
///
/// A family is only registered when its credential (hosted providers) or
/// base URL (self-hosted providers) is present.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// Overrides the OpenAI API base, e.g. for a regional endpoint or proxy.
    #[serde(default)]
    pub openai_base_url: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub ollama_url: Option<String>,
    #[serde(default)]
    pub ollama_models: Vec<DynamicModelSpec>,
    #[serde(default)]
    pub openai_compatible_url: Option<String>,
    #[serde(default)]
    pub openai_compatible_key: Option<String>,
    #[serde(default)]
    pub openai_compatible_models: Vec<DynamicModelSpec>,
}

// Hand-written so API keys never reach logs.
impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(key: &Option<String>) -> &'static str {
            if key.is_some() { "[REDACTED]" } else { "None" }
        }
        f.debug_struct("ProviderSettings")
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("anthropic_api_key", &redact(&self.anthropic_api_key))
            .field("ollama_url", &self.ollama_url)
            .field("ollama_models", &self.ollama_models)
            .field("openai_compatible_url", &self.openai_compatible_url)
            .field("openai_compatible_key", &redact(&self.openai_compatible_key))
            .field("openai_compatible_models", &self.openai_compatible_models)
            .finish()
    }
}

/// Tuning for the retrieval chunk assembler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalSettings {
    /// Maximum number of sources kept after fetching.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Maximum number of concurrent fetches.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    /// Per-fetch timeout in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    /// Target token length of the raw chunks a PDF is split into.
    #[serde(default = "default_pdf_chunk_tokens")]
    pub pdf_chunk_tokens: usize,
}

fn default_max_results() -> usize {
    5
}

fn default_fetch_concurrency() -> usize {
    10
}

fn default_fetch_timeout_secs() -> u64 {
    5
}

fn default_pdf_chunk_tokens() -> usize {
    250
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            fetch_concurrency: default_fetch_concurrency(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            pdf_chunk_tokens: default_pdf_chunk_tokens(),
        }
    }
}

/// Problems found while loading configuration.
///
/// The loader downgrades every one of these to a warning and falls back to
/// defaults; they surface as values so callers can decide otherwise.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("invalid config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid model list in {var}: {message}")]
    ModelList { var: String, message: String },
}
