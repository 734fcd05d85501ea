//! PDF text extraction and splitting.

use text_splitter::TextSplitter;

use scribe_core::retrieval::PdfSplitter;
use scribe_types::retrieval::RetrievalError;

/// [`PdfSplitter`] using `pdf-extract` for text and `text-splitter` for
/// boundary-aware chunking.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextSplitter;

/// Split `text` into chunks of at most `max_chars` characters, preferring
/// paragraph, then sentence, then word boundaries.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    TextSplitter::new(max_chars.max(1))
        .chunks(text)
        .map(str::to_string)
        .collect()
}

impl PdfSplitter for PdfTextSplitter {
    fn split(&self, bytes: &[u8], max_chars: usize) -> Result<Vec<String>, RetrievalError> {
        let text = pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| RetrievalError::Pdf(format!("failed to extract text: {e}")))?;
        let chunks = split_text(&text, max_chars);
        tracing::debug!(chars = text.len(), chunks = chunks.len(), "split pdf");
        Ok(chunks)
    }
}
