//! Retrieval collaborators: scraping, PDF splitting and token counting.
//!
//! [`default_assembler`] wires the production implementations into a
//! [`ChunkAssembler`].

pub mod html;
pub mod pdf;
pub mod scraper;
pub mod tokenizer;

use std::time::Duration;

use scribe_core::retrieval::assembler::ChunkAssembler;
use scribe_types::config::RetrievalSettings;
use scribe_types::retrieval::RetrievalError;

pub use self::pdf::PdfTextSplitter;
pub use self::scraper::HttpScraper;
pub use self::tokenizer::Gpt2TokenEstimator;

/// The assembler type the CLI uses.
pub type DefaultAssembler = ChunkAssembler<HttpScraper, PdfTextSplitter, Gpt2TokenEstimator>;

/// Build an assembler over HTTP scraping, `pdf-extract` and GPT-2 token counts.
pub fn default_assembler(settings: RetrievalSettings) -> Result<DefaultAssembler, RetrievalError> {
    let scraper = HttpScraper::new(Duration::from_secs(settings.fetch_timeout_secs.max(1)))?;
    let tokenizer = Gpt2TokenEstimator::new()?;
    Ok(ChunkAssembler::new(scraper, PdfTextSplitter, tokenizer, settings))
}
