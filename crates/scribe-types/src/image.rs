//! Image payloads attached to conversation turns.
//!
//! Images travel through the system as `data:<mime>;base64,<payload>` URLs
//! (the form browsers produce). [`ImageData`] keeps the decoded bytes and the
//! media type together so each adapter can render whichever shape its
//! backend expects: the full data URL, or the bare base64 payload.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::llm::LlmError;

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// An image with its media type.
///
/// The media type and the payload are always present together; there is no
/// way to construct an `ImageData` without both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageData {
    media_type: String,
    bytes: Vec<u8>,
}

impl ImageData {
    /// Create an image from a media type (e.g. `image/png`) and raw bytes.
    pub fn new(media_type: impl Into<String>, bytes: Vec<u8>) -> Result<Self, LlmError> {
        let media_type = media_type.into();
        if media_type.trim().is_empty() {
            return Err(LlmError::InvalidImage("missing media type".to_string()));
        }
        if bytes.is_empty() {
            return Err(LlmError::InvalidImage("empty image payload".to_string()));
        }
        Ok(Self { media_type, bytes })
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self, LlmError> {
        let rest = url
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| LlmError::InvalidImage("not a data URL".to_string()))?;
        let (media_type, payload) = rest
            .split_once(BASE64_MARKER)
            .ok_or_else(|| LlmError::InvalidImage("data URL is not base64 encoded".to_string()))?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| LlmError::InvalidImage(format!("invalid base64 payload: {e}")))?;
        Self::new(media_type, bytes)
    }

    /// The media type, e.g. `image/jpeg`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// The decoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The payload alone, base64 encoded (Anthropic and Ollama want this).
    pub fn base64_payload(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// The self-describing `data:` URL form (OpenAI-style `image_url` parts).
    pub fn to_data_url(&self) -> String {
        format!(
            "{DATA_URL_PREFIX}{}{BASE64_MARKER}{}",
            self.media_type,
            self.base64_payload()
        )
    }
}

impl fmt::Display for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_data_url())
    }
}

impl FromStr for ImageData {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_data_url(s)
    }
}

impl TryFrom<String> for ImageData {
    type Error = LlmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_data_url(&value)
    }
}

impl From<ImageData> for String {
    fn from(image: ImageData) -> Self {
        image.to_data_url()
    }
}
