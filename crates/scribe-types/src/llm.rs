//! LLM request types for Scribe.
//!
//! These types model the provider-agnostic side of an LLM call: the
//! capability descriptor of a model, the invocation request (prompt, history,
//! images, sampling hints) and the errors an adapter can report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::image::ImageData;

/// Sampling temperature used when a request does not specify one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Role of a message in an LLM conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Wire name shared by every backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(MessageRole::System),
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// Static metadata about one model.
///
/// Serializes to the catalog format handed to callers that enumerate the
/// available models: `code, name, desc, traits, accepts_images,
/// context_length, supports_json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Registry identifier (e.g. `gpt-4o`, `llama3-ollama`).
    #[serde(rename = "code")]
    pub id: String,
    /// How users see the model presented.
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "desc")]
    pub description: String,
    /// A couple of words describing the model's strengths.
    pub traits: String,
    pub accepts_images: bool,
    /// Raw context window in tokens.
    pub context_length: u32,
    pub supports_json: bool,
}

/// One prior exchange in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRound {
    #[serde(rename = "user")]
    pub user_text: String,
    #[serde(rename = "ai")]
    pub assistant_text: String,
    #[serde(default)]
    pub images: Vec<ImageData>,
}

impl ConversationRound {
    pub fn new(user_text: impl Into<String>, assistant_text: impl Into<String>) -> Self {
        Self {
            user_text: user_text.into(),
            assistant_text: assistant_text.into(),
            images: Vec::new(),
        }
    }

    pub fn with_images(mut self, images: Vec<ImageData>) -> Self {
        self.images = images;
        self
    }
}

/// A provider-agnostic request to a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub history: Vec<ConversationRound>,
    #[serde(default)]
    pub images: Vec<ImageData>,
    /// Sampling temperature in `[0, 1]`; [`DEFAULT_TEMPERATURE`] when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Soft hint: only honored by models whose descriptor supports JSON.
    #[serde(default)]
    pub want_json: bool,
}

impl InvocationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_history(mut self, history: Vec<ConversationRound>) -> Self {
        self.history = history;
        self
    }

    pub fn with_images(mut self, images: Vec<ImageData>) -> Self {
        self.images = images;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_json(mut self, want_json: bool) -> Self {
        self.want_json = want_json;
        self
    }

    /// The temperature to send, falling back to [`DEFAULT_TEMPERATURE`].
    pub fn effective_temperature(&self) -> f64 {
        self.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Reject requests no backend could serve.
    pub fn validate(&self) -> Result<(), LlmError> {
        if let Some(t) = self.temperature {
            if !(0.0..=1.0).contains(&t) {
                return Err(LlmError::InvalidRequest(format!(
                    "temperature {t} is outside [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Errors from LLM provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// The registry has no model with this id. Distinct from transport
    /// failures so callers can retry against a fallback model.
    #[error("model not found: '{0}'")]
    UnknownModel(String),

    #[error("{operation} not implemented for model '{model}'")]
    NotImplemented {
        model: String,
        operation: &'static str,
    },

    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("provider overloaded: {0}")]
    Overloaded(String),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid image data: {0}")]
    InvalidImage(String),
}

impl LlmError {
    /// Whether this error means the model id itself was wrong.
    pub fn is_unknown_model(&self) -> bool {
        matches!(self, LlmError::UnknownModel(_))
    }
}

/// Wire-protocol family of a provider adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Anthropic,
    Ollama,
    #[serde(rename = "openai_compatible")]
    OpenAiCompatible,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::Ollama => write!(f, "ollama"),
            ProviderKind::OpenAiCompatible => write!(f, "openai_compatible"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "anthropic" => Ok(ProviderKind::Anthropic),
            "ollama" => Ok(ProviderKind::Ollama),
            "openai_compatible" => Ok(ProviderKind::OpenAiCompatible),
            other => Err(format!("invalid provider kind: '{other}'")),
        }
    }
}

/// One model declared through the environment for a dynamic family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicModelSpec {
    /// Backend model code (e.g. `llama3.1:8b`).
    pub code: String,
    pub context_length: u32,
    #[serde(default)]
    pub vision: bool,
}
