//! Retrieval chunk assembler.
//!
//! 1. Scrape every candidate concurrently, bounded by a semaphore, each fetch
//!    under its own timeout.
//! 2. Keep the first `max_results` successes in candidate rank order.
//! 3. Split the safe budget evenly across them.
//! 4. Extract a bounded slice of text per source and wrap it as a [`Chunk`].
//!
//! A failed fetch or a failed extraction drops only that source.

use std::sync::Arc;
use std::time::Duration;

use scribe_types::config::RetrievalSettings;
use scribe_types::retrieval::{
    Chunk, RetrievalError, RetrievalSource, ScrapeOutcome, SearchCandidate, SourceContent,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::extract::{accumulate_chunks, centered_slice, ntokens_to_nchars};
use super::{PageScraper, PdfSplitter, TokenEstimator};

/// Builds token-budgeted chunks from ranked search candidates.
pub struct ChunkAssembler<S, P, T> {
    scraper: Arc<S>,
    splitter: Arc<P>,
    tokenizer: Arc<T>,
    settings: RetrievalSettings,
}

impl<S, P, T> ChunkAssembler<S, P, T>
where
    S: PageScraper + 'static,
    P: PdfSplitter + 'static,
    T: TokenEstimator + 'static,
{
    pub fn new(scraper: S, splitter: P, tokenizer: T, settings: RetrievalSettings) -> Self {
        Self {
            scraper: Arc::new(scraper),
            splitter: Arc::new(splitter),
            tokenizer: Arc::new(tokenizer),
            settings,
        }
    }

    pub fn settings(&self) -> &RetrievalSettings {
        &self.settings
    }

    /// Assemble chunks for `candidates` within `safe_budget` tokens.
    ///
    /// Returns an empty list when no candidate could be fetched. Chunk indices
    /// are sequential over the chunks actually produced.
    pub async fn assemble(&self, candidates: &[SearchCandidate], safe_budget: u32) -> Vec<Chunk> {
        let sources = self.fetch_sources(candidates).await;
        if sources.is_empty() {
            tracing::debug!(candidates = candidates.len(), "no sources fetched");
            return Vec::new();
        }

        let per_source_budget = safe_budget as usize / sources.len();
        tracing::debug!(
            sources = sources.len(),
            safe_budget,
            per_source_budget,
            "allocating retrieval budget"
        );

        let mut chunks = Vec::with_capacity(sources.len());
        for source in sources {
            let text = match self.extract(&source, per_source_budget).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(url = %source.url, error = %e, "dropping source after extraction failure");
                    continue;
                }
            };
            let chunk = Chunk::new(
                chunks.len(),
                format!("{} ({})", source.title, source.url),
                text,
            )
            .with_url(Some(source.url))
            .with_image(source.image_url)
            .with_favicon(source.favicon);
            chunks.push(chunk);
        }
        chunks
    }

    /// Scrape all candidates and return the successes in rank order,
    /// truncated to `max_results`.
    ///
    /// The reported url is the candidate's; a missing page title falls back
    /// to the candidate name.
    pub async fn fetch_sources(&self, candidates: &[SearchCandidate]) -> Vec<RetrievalSource> {
        let semaphore = Arc::new(Semaphore::new(self.settings.fetch_concurrency.max(1)));
        let timeout_secs = self.settings.fetch_timeout_secs.max(1);
        let mut join_set = JoinSet::new();

        for (rank, candidate) in candidates.iter().enumerate() {
            let scraper = Arc::clone(&self.scraper);
            let semaphore = Arc::clone(&semaphore);
            let url = candidate.url.clone();

            join_set.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (rank, ScrapeOutcome::failure("fetch pool closed"));
                };
                let outcome =
                    tokio::time::timeout(Duration::from_secs(timeout_secs), scraper.scrape(&url))
                        .await
                        .unwrap_or_else(|_| {
                            ScrapeOutcome::failure(RetrievalError::Timeout { secs: timeout_secs }.to_string())
                        });
                (rank, outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(candidates.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => tracing::warn!(error = %e, "fetch task failed"),
            }
        }
        tracing::debug!(
            candidates = candidates.len(),
            succeeded = outcomes.iter().filter(|(_, outcome)| outcome.is_success()).count(),
            "fetch finished"
        );

        let mut fetched = Vec::new();
        for (rank, outcome) in outcomes {
            match outcome {
                ScrapeOutcome::Success(source) => fetched.push((rank, source)),
                ScrapeOutcome::Failure { reason } => {
                    tracing::warn!(url = %candidates[rank].url, reason = %reason, "dropping source");
                }
            }
        }

        fetched.sort_by_key(|(rank, _)| *rank);
        fetched
            .into_iter()
            .take(self.settings.max_results)
            .map(|(rank, mut source)| {
                let candidate = &candidates[rank];
                source.url = candidate.url.clone();
                if source.title.is_empty() {
                    source.title = candidate.name.clone();
                }
                source
            })
            .collect()
    }

    async fn extract(
        &self,
        source: &RetrievalSource,
        per_source_budget: usize,
    ) -> Result<String, RetrievalError> {
        match &source.content {
            SourceContent::Text(text) => Ok(centered_slice(text, ntokens_to_nchars(per_source_budget))),
            SourceContent::Pdf(bytes) => {
                let splitter = Arc::clone(&self.splitter);
                let bytes = bytes.clone();
                let max_chars = ntokens_to_nchars(self.settings.pdf_chunk_tokens);
                let raw_chunks =
                    tokio::task::spawn_blocking(move || splitter.split(&bytes, max_chars))
                        .await
                        .map_err(|e| RetrievalError::Pdf(e.to_string()))??;

                tracing::debug!(url = %source.url, raw_chunks = raw_chunks.len(), "split pdf");
                Ok(accumulate_chunks(&raw_chunks, per_source_budget, |chunk| {
                    self.tokenizer.estimate(chunk)
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned outcomes; unknown urls fail.
    #[derive(Default)]
    struct MockScraper {
        pages: HashMap<String, (ScrapeOutcome, u64)>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MockScraper {
        fn page(mut self, url: &str, title: &str, text: &str, delay_ms: u64) -> Self {
            let source = RetrievalSource::new(url, SourceContent::Text(text.to_string()))
                .with_title(title);
            self.pages
                .insert(url.to_string(), (ScrapeOutcome::Success(source), delay_ms));
            self
        }

        fn pdf(mut self, url: &str, bytes: &[u8]) -> Self {
            let source = RetrievalSource::new(url, SourceContent::Pdf(bytes.to_vec()))
                .with_title("Paper");
            self.pages
                .insert(url.to_string(), (ScrapeOutcome::Success(source), 0));
            self
        }
    }

    impl PageScraper for MockScraper {
        async fn scrape(&self, url: &str) -> ScrapeOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            let outcome = match self.pages.get(url) {
                Some((outcome, delay_ms)) => {
                    tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
                    outcome.clone()
                }
                None => ScrapeOutcome::failure("404"),
            };
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        }
    }

    /// Treats the bytes as UTF-8 and cuts them into fixed-size pieces.
    struct FixedSplitter;

    impl PdfSplitter for FixedSplitter {
        fn split(&self, bytes: &[u8], max_chars: usize) -> Result<Vec<String>, RetrievalError> {
            let text = std::str::from_utf8(bytes).map_err(|e| RetrievalError::Pdf(e.to_string()))?;
            let chars: Vec<char> = text.chars().collect();
            Ok(chars
                .chunks(max_chars.max(1))
                .map(|c| c.iter().collect())
                .collect())
        }
    }

    /// One token per character.
    struct CharTokens;

    impl TokenEstimator for CharTokens {
        fn estimate(&self, text: &str) -> usize {
            text.chars().count()
        }
    }

    fn assembler(
        scraper: MockScraper,
        settings: RetrievalSettings,
    ) -> ChunkAssembler<MockScraper, FixedSplitter, CharTokens> {
        ChunkAssembler::new(scraper, FixedSplitter, CharTokens, settings)
    }

    fn candidates(urls: &[&str]) -> Vec<SearchCandidate> {
        urls.iter()
            .enumerate()
            .map(|(i, url)| SearchCandidate::new(format!("Result {i}"), *url))
            .collect()
    }

    #[tokio::test]
    async fn test_three_of_five_fail() {
        let long = "x".repeat(10_000);
        let scraper = MockScraper::default()
            .page("https://a.example", "A", &long, 0)
            .page("https://d.example", "D", &long, 0);
        let assembler = assembler(scraper, RetrievalSettings::default());
        let urls = [
            "https://a.example",
            "https://b.example",
            "https://c.example",
            "https://d.example",
            "https://e.example",
        ];

        let budget = 1_001;
        let chunks = assembler.assemble(&candidates(&urls), budget).await;

        assert_eq!(chunks.len(), 2);
        let per_source = (budget / 2) as usize;
        for chunk in &chunks {
            assert_eq!(chunk.text.chars().count(), ntokens_to_nchars(per_source));
        }
        assert_eq!(chunks[0].source_name, "A (https://a.example)");
        assert_eq!(chunks[1].source_name, "D (https://d.example)");
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[1].index, 1);
    }

    #[tokio::test]
    async fn test_rank_order_survives_completion_order() {
        // Rank 0 finishes last.
        let scraper = MockScraper::default()
            .page("https://first.example", "First", "one", 60)
            .page("https://second.example", "Second", "two", 20)
            .page("https://third.example", "Third", "three", 0);
        let assembler = assembler(scraper, RetrievalSettings::default());
        let chunks = assembler
            .assemble(
                &candidates(&["https://first.example", "https://second.example", "https://third.example"]),
                3_000,
            )
            .await;
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_max_results_keeps_top_ranked() {
        let mut scraper = MockScraper::default();
        let urls: Vec<String> = (0..7).map(|i| format!("https://{i}.example")).collect();
        for url in &urls {
            scraper = scraper.page(url, url, "body", 0);
        }
        let settings = RetrievalSettings {
            max_results: 3,
            ..RetrievalSettings::default()
        };
        let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
        let chunks = assembler(scraper, settings)
            .assemble(&candidates(&url_refs), 900)
            .await;
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].url.as_deref(), Some("https://2.example"));
    }

    #[tokio::test]
    async fn test_no_successes_yields_nothing() {
        let chunks = assembler(MockScraper::default(), RetrievalSettings::default())
            .assemble(&candidates(&["https://gone.example"]), 10_000)
            .await;
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_title_falls_back_to_candidate_name() {
        let scraper = MockScraper::default().page("https://untitled.example", "", "text", 0);
        let chunks = assembler(scraper, RetrievalSettings::default())
            .assemble(&candidates(&["https://untitled.example"]), 100)
            .await;
        assert_eq!(chunks[0].source_name, "Result 0 (https://untitled.example)");
    }

    #[tokio::test]
    async fn test_pdf_accumulation_hard_stops() {
        let scraper = MockScraper::default().pdf("https://paper.example/a.pdf", b"aaaaaaaabbbbbbbbcccccccc");
        let settings = RetrievalSettings {
            pdf_chunk_tokens: 2,
            ..RetrievalSettings::default()
        };
        let chunks = assembler(scraper, settings)
            .assemble(&candidates(&["https://paper.example/a.pdf"]), 20)
            .await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "aaaaaaaabbbbbbbb");
    }

    #[tokio::test]
    async fn test_extraction_failure_drops_only_that_source() {
        let scraper = MockScraper::default()
            .pdf("https://broken.example/x.pdf", &[0xff, 0xfe, 0xfd])
            .page("https://ok.example", "Ok", "fine", 0);
        let chunks = assembler(scraper, RetrievalSettings::default())
            .assemble(
                &candidates(&["https://broken.example/x.pdf", "https://ok.example"]),
                1_000,
            )
            .await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].text, "fine");
    }

    #[tokio::test]
    async fn test_fetch_concurrency_is_bounded() {
        let mut scraper = MockScraper::default();
        let urls: Vec<String> = (0..6).map(|i| format!("https://{i}.example")).collect();
        for url in &urls {
            scraper = scraper.page(url, "t", "body", 30);
        }
        let settings = RetrievalSettings {
            fetch_concurrency: 2,
            max_results: 10,
            ..RetrievalSettings::default()
        };
        let assembler = assembler(scraper, settings);
        let url_refs: Vec<&str> = urls.iter().map(String::as_str).collect();
        let sources = assembler.fetch_sources(&candidates(&url_refs)).await;
        assert_eq!(sources.len(), 6);
        assert!(assembler.scraper.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_slow_fetch_times_out() {
        let scraper = MockScraper::default()
            .page("https://slow.example", "Slow", "late", 3_000)
            .page("https://fast.example", "Fast", "early", 0);
        let settings = RetrievalSettings {
            fetch_timeout_secs: 1,
            ..RetrievalSettings::default()
        };
        let chunks = assembler(scraper, settings)
            .assemble(&candidates(&["https://slow.example", "https://fast.example"]), 100)
            .await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "early");
    }

    #[tokio::test]
    async fn test_zero_timeout_is_floored_to_one_second() {
        let scraper = MockScraper::default().page("https://a.example", "A", "arrives", 50);
        let settings = RetrievalSettings {
            fetch_timeout_secs: 0,
            ..RetrievalSettings::default()
        };
        let chunks = assembler(scraper, settings)
            .assemble(&candidates(&["https://a.example"]), 100)
            .await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "arrives");
    }

    #[tokio::test]
    async fn test_fetch_sources_keeps_only_successes() {
        let scraper = MockScraper::default()
            .page("https://b.example", "B", "bee", 10)
            .page("https://d.example", "D", "dee", 0);
        let assembler = assembler(scraper, RetrievalSettings::default());
        let sources = assembler
            .fetch_sources(&candidates(&[
                "https://a.example",
                "https://b.example",
                "https://c.example",
                "https://d.example",
            ]))
            .await;
        let urls: Vec<&str> = sources.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(urls, vec!["https://b.example", "https://d.example"]);
        assert_eq!(sources[0].title, "B");
    }

    #[tokio::test]
    async fn test_chunk_carries_optional_metadata() {
        let mut scraper = MockScraper::default();
        let mut source = RetrievalSource::new("https://meta.example", SourceContent::Text("t".into()))
            .with_title("Meta");
        source.image_url = Some("https://meta.example/og.png".into());
        source.favicon = Some(String::new());
        scraper
            .pages
            .insert("https://meta.example".into(), (ScrapeOutcome::Success(source), 0));

        let chunks = assembler(scraper, RetrievalSettings::default())
            .assemble(&candidates(&["https://meta.example"]), 100)
            .await;
        assert_eq!(chunks[0].image.as_deref(), Some("https://meta.example/og.png"));
        assert!(chunks[0].favicon.is_none());
    }
}
