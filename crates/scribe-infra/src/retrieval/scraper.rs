//! HTTP page scraper.
//!
//! Fetches a URL with browser-like headers and classifies the body:
//! `application/pdf` is kept as raw bytes for the PDF splitter, anything
//! else is treated as HTML and reduced to its visible text plus metadata.

use std::time::Duration;

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};

use scribe_core::retrieval::PageScraper;
use scribe_types::retrieval::{RetrievalError, RetrievalSource, ScrapeOutcome, SourceContent};

use super::html;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";
const BROWSER_ACCEPT: &str =
    "application/json, text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";

/// [`PageScraper`] backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpScraper {
    client: reqwest::Client,
}

impl HttpScraper {
    pub fn new(timeout: Duration) -> Result<Self, RetrievalError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| RetrievalError::Fetch(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<RetrievalSource, RetrievalError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RetrievalError::Fetch(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Fetch(format!("HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_default();
        let final_url = response.url().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| RetrievalError::Fetch(format!("failed to read body: {e}")))?;

        if content_type == "application/pdf" {
            return Ok(RetrievalSource::new(url, SourceContent::Pdf(body.to_vec())));
        }

        let page = String::from_utf8_lossy(&body);
        let mut source = RetrievalSource::new(url, SourceContent::Text(html::visible_text(&page)));
        if let Some(title) = html::page_title(&page) {
            source = source.with_title(title);
        }
        source.image_url = html::preview_image(&page);
        source.favicon = html::favicon(&page, &final_url);
        Ok(source)
    }
}

impl PageScraper for HttpScraper {
    async fn scrape(&self, url: &str) -> ScrapeOutcome {
        match self.fetch(url).await {
            Ok(source) => {
                tracing::debug!(url, kind = %source.kind(), "scraped source");
                ScrapeOutcome::Success(source)
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "scrape failed");
                ScrapeOutcome::failure(e.to_string())
            }
        }
    }
}
