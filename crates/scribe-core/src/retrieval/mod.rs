//! Budgeted retrieval context.
//!
//! [`assembler::ChunkAssembler`] turns ranked search candidates into prompt
//! chunks. It drives three collaborators that live in the infrastructure
//! layer: a page scraper, a PDF splitter and an accurate token estimator.

pub mod assembler;
pub mod extract;

use std::future::Future;

use scribe_types::retrieval::{RetrievalError, ScrapeOutcome};

/// Fetches one URL and classifies it as text or PDF.
///
/// Implementations never fail: every problem is a [`ScrapeOutcome::Failure`].
pub trait PageScraper: Send + Sync {
    fn scrape(&self, url: &str) -> impl Future<Output = ScrapeOutcome> + Send;
}

/// Loads a PDF and splits its text into chunks of at most `max_chars` characters.
///
/// Synchronous: callers run it on a blocking thread.
pub trait PdfSplitter: Send + Sync {
    fn split(&self, bytes: &[u8], max_chars: usize) -> Result<Vec<String>, RetrievalError>;
}

/// Counts tokens the way the target tokenizer would.
pub trait TokenEstimator: Send + Sync {
    fn estimate(&self, text: &str) -> usize;
}
