//! Retrieval types: search candidates, scraped sources and prompt chunks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A ranked search hit handed to the chunk assembler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Title reported by the search engine (used when the page has none).
    pub name: String,
    pub url: String,
}

impl SearchCandidate {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// What kind of document a source holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Text,
    Pdf,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Text => write!(f, "text"),
            SourceKind::Pdf => write!(f, "pdf"),
        }
    }
}

/// Body of a scraped source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceContent {
    Text(String),
    Pdf(Vec<u8>),
}

impl SourceContent {
    pub fn kind(&self) -> SourceKind {
        match self {
            SourceContent::Text(_) => SourceKind::Text,
            SourceContent::Pdf(_) => SourceKind::Pdf,
        }
    }
}

/// A successfully scraped page or document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalSource {
    /// Page title; empty when the document did not declare one.
    pub title: String,
    pub url: String,
    pub content: SourceContent,
    /// Preview image (`og:image` / `twitter:image`).
    pub image_url: Option<String>,
    pub favicon: Option<String>,
}

impl RetrievalSource {
    pub fn new(url: impl Into<String>, content: SourceContent) -> Self {
        Self {
            title: String::new(),
            url: url.into(),
            content,
            image_url: None,
            favicon: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn kind(&self) -> SourceKind {
        self.content.kind()
    }
}

/// Result of scraping one URL.
///
/// Scrapers never raise: a failed fetch is a structured `Failure` that the
/// assembler treats as "drop this source".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScrapeOutcome {
    Success(RetrievalSource),
    Failure { reason: String },
}

impl ScrapeOutcome {
    pub fn failure(reason: impl Into<String>) -> Self {
        ScrapeOutcome::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeOutcome::Success(_))
    }
}

/// A bounded unit of retrieved text attributed to one source.
///
/// Serializes with `index, source, text` always present and `url, image,
/// favicon` only when set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    #[serde(rename = "source")]
    pub source_name: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl Chunk {
    pub fn new(index: usize, source_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index,
            source_name: source_name.into(),
            text: text.into(),
            embedding: None,
            url: None,
            image: None,
            favicon: None,
        }
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = non_empty(url);
        self
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = non_empty(image);
        self
    }

    pub fn with_favicon(mut self, favicon: Option<String>) -> Self {
        self.favicon = non_empty(favicon);
        self
    }

    /// Attach a vector computed after assembly. The text is left untouched.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Errors raised while turning a source into text.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("fetch timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("unsupported content type: {0}")]
    UnsupportedContent(String),

    #[error("pdf error: {0}")]
    Pdf(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_with_embedding_serializes_vector() {
        let chunk = Chunk::new(1, "Doc (https://d.example)", "body").with_embedding(vec![0.5, 0.25]);
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["embedding"], serde_json::json!([0.5, 0.25]));
        assert_eq!(json["text"], "body");
    }

    #[test]
    fn test_chunk_omits_absent_optionals() {
        let chunk = Chunk::new(0, "Rust (https://rust-lang.org)", "text");
        let json = serde_json::to_value(&chunk).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 3);
        assert_eq!(json["index"], 0);
        assert_eq!(json["source"], "Rust (https://rust-lang.org)");
        assert_eq!(json["text"], "text");
        assert!(obj.get("url").is_none());
        assert!(obj.get("image").is_none());
        assert!(obj.get("favicon").is_none());
    }

    #[test]
    fn test_chunk_empty_strings_are_omitted() {
        let chunk = Chunk::new(1, "s", "t")
            .with_url(Some("https://a.dev".to_string()))
            .with_image(Some(String::new()))
            .with_favicon(Some("https://a.dev/favicon.ico".to_string()));
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["url"], "https://a.dev");
        assert_eq!(json["favicon"], "https://a.dev/favicon.ico");
        assert!(json.get("image").is_none());
    }

    #[test]
    fn test_source_kind() {
        let text = RetrievalSource::new("https://a.dev", SourceContent::Text("hi".to_string()));
        assert_eq!(text.kind(), SourceKind::Text);
        let pdf = RetrievalSource::new("https://a.dev/x.pdf", SourceContent::Pdf(vec![1]));
        assert_eq!(pdf.kind(), SourceKind::Pdf);
        assert_eq!(pdf.kind().to_string(), "pdf");
    }

    #[test]
    fn test_scrape_outcome_failure() {
        let outcome = ScrapeOutcome::failure("Failed to scrape website");
        assert!(!outcome.is_success());
        match outcome {
            ScrapeOutcome::Failure { reason } => assert_eq!(reason, "Failed to scrape website"),
            ScrapeOutcome::Success(_) => panic!("expected failure"),
        }
    }
}
