//! `scribe retrieve`: fetch URLs and print the assembled chunks as JSON.

use anyhow::Result;
use tracing::Instrument;

use scribe_core::llm::registry::ModelRegistry;
use scribe_infra::retrieval::default_assembler;
use scribe_types::config::RetrievalSettings;
use scribe_types::retrieval::SearchCandidate;

/// Candidates for raw URLs. The name is the URL itself; the page title
/// replaces it once the page is fetched.
pub fn candidates_from_urls(urls: &[String]) -> Vec<SearchCandidate> {
    urls.iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(|url| SearchCandidate::new(url, url))
        .collect()
}

pub async fn retrieve(
    registry: &ModelRegistry,
    model: &str,
    urls: &[String],
    mut settings: RetrievalSettings,
    max_results: Option<usize>,
) -> Result<()> {
    let safe_budget = registry.safe_budget(model)?;
    if let Some(max_results) = max_results {
        settings.max_results = max_results;
    }

    let candidates = candidates_from_urls(urls);
    let assembler = default_assembler(settings)?;
    let chunks = assembler
        .assemble(&candidates, safe_budget)
        .instrument(scribe_observe::spans::retrieve_span(
            model,
            candidates.len(),
            safe_budget,
        ))
        .await;

    if chunks.is_empty() {
        tracing::warn!(urls = urls.len(), "no sources could be fetched");
    }
    println!("{}", serde_json::to_string_pretty(&chunks)?);
    Ok(())
}
