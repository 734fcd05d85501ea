//! Wire types for servers that speak the OpenAI chat-completions dialect.
//!
//! Deliberately loose on the response side: self-hosted servers differ in
//! which optional fields they send.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct CompatChatRequest {
    pub model: String,
    pub messages: Vec<CompatMessage>,
    pub temperature: f64,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompatMessage {
    pub role: String,
    pub content: CompatContent,
}

/// Plain string content, or text plus image parts for multimodal turns.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CompatContent {
    Text(String),
    Parts(Vec<CompatPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompatPart {
    Text { text: String },
    ImageUrl { image_url: CompatImageUrl },
}

/// `url` carries a full `data:<mime>;base64,...` URL.
#[derive(Debug, Clone, Serialize)]
pub struct CompatImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompatChatResponse {
    #[serde(default)]
    pub choices: Vec<CompatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompatChoice {
    pub message: CompatResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Payload of one SSE `data:` event.
#[derive(Debug, Clone, Deserialize)]
pub struct CompatStreamChunk {
    #[serde(default)]
    pub choices: Vec<CompatStreamChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompatStreamChoice {
    #[serde(default)]
    pub delta: CompatDelta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompatDelta {
    #[serde(default)]
    pub content: Option<String>,
}
