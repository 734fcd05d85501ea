//! Liveness probes for self-hosted backends.
//!
//! A probe only tells the operator early that a base URL looks wrong. The
//! registry logs a failed probe and registers the family anyway.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use scribe_types::llm::LlmError;

use super::http::send;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

fn probe_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(PROBE_TIMEOUT)
        .build()
        .map_err(|e| LlmError::Provider {
            message: format!("failed to create HTTP client: {e}"),
        })
}

/// `GET {base}/api/tags`.
pub async fn probe_ollama(base_url: &str) -> Result<(), LlmError> {
    let url = format!("{}/api/tags", base_url.trim_end_matches('/'));
    send(probe_client()?.get(url)).await.map(drop)
}

/// `GET {base}/v1/models`, authenticated when a key is configured.
pub async fn probe_openai_compatible(base_url: &str, api_key: Option<&SecretString>) -> Result<(), LlmError> {
    let url = format!("{}/v1/models", base_url.trim_end_matches('/'));
    let mut builder = probe_client()?.get(url);
    if let Some(key) = api_key {
        builder = builder.bearer_auth(key.expose_secret());
    }
    send(builder).await.map(drop)
}
