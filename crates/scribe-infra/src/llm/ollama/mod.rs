//! Ollama chat adapter.
//!
//! Talks to `POST {base}/api/chat`. Non-streaming calls receive one JSON
//! object; streaming calls receive NDJSON, one partial message per line.
//! Lines that fail to parse are skipped.

pub mod types;

use futures_util::StreamExt;
use tracing::Instrument;

use scribe_core::llm::provider::{LlmProvider, TextStream};
use scribe_core::llm::turns::conversation_turns;
use scribe_observe::spans::chat_span;
use scribe_types::image::ImageData;
use scribe_types::llm::{CapabilityDescriptor, InvocationRequest, LlmError, MessageRole, ProviderKind};

use self::types::{OllamaChatRequest, OllamaChatResponse, OllamaMessage, OllamaOptions};
use super::http::{build_client, send, settle_stream};
use super::lines::LineBuffer;

/// Adapter for one model served by an Ollama instance.
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    /// Model name as Ollama knows it (`llama3.1:8b`), not the registry id.
    model_code: String,
    descriptor: CapabilityDescriptor,
}

impl OllamaProvider {
    pub fn new(
        base_url: &str,
        model_code: impl Into<String>,
        descriptor: CapabilityDescriptor,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model_code: model_code.into(),
            descriptor,
        })
    }

    fn url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    fn to_ollama_request(&self, request: &InvocationRequest, stream: bool) -> OllamaChatRequest {
        let mut messages = Vec::with_capacity(request.history.len() * 2 + 2);

        if let Some(system) = request.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            messages.push(OllamaMessage {
                role: MessageRole::System.as_str().to_string(),
                content: system.to_string(),
                images: Vec::new(),
            });
        }

        for turn in conversation_turns(request, self.descriptor.accepts_images) {
            messages.push(OllamaMessage {
                role: turn.role.as_str().to_string(),
                content: turn.text.to_string(),
                images: turn.images.iter().map(ImageData::base64_payload).collect(),
            });
        }

        let want_json = request.want_json && self.descriptor.supports_json;
        OllamaChatRequest {
            model: self.model_code.clone(),
            messages,
            stream,
            format: want_json.then(|| "json".to_string()),
            options: OllamaOptions {
                temperature: request.effective_temperature(),
                num_ctx: stream.then_some(self.descriptor.context_length),
            },
        }
    }
}

/// Decode one NDJSON line into its text fragment.
///
/// `Ok(None)` for lines without text (the closing `done` line, or a line that
/// did not parse). An `error` line ends the stream.
fn parse_line(model: &str, line: &str) -> Result<Option<String>, LlmError> {
    let parsed: OllamaChatResponse = match serde_json::from_str(line) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(model, error = %e, "skipping malformed stream line");
            return Ok(None);
        }
    };
    if let Some(message) = parsed.error {
        return Err(LlmError::Provider { message });
    }
    Ok(parsed
        .message
        .map(|m| m.content)
        .filter(|content| !content.is_empty()))
}

impl LlmProvider for OllamaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, request: &InvocationRequest) -> Result<String, LlmError> {
        request.validate()?;
        let body = self.to_ollama_request(request, false);
        let span = chat_span("ollama", &self.model_code, body.options.temperature, false);

        async {
            let response = send(self.client.post(self.url()).json(&body)).await?;
            let parsed: OllamaChatResponse = response
                .json()
                .await
                .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;
            if let Some(message) = parsed.error {
                return Err(LlmError::Provider { message });
            }
            Ok::<_, LlmError>(parsed.message.map(|m| m.content).unwrap_or_default())
        }
        .instrument(span)
        .await
    }

    fn stream(&self, request: InvocationRequest) -> TextStream {
        if let Err(e) = request.validate() {
            return Box::pin(futures_util::stream::once(async move { Err(e) }));
        }

        let body = self.to_ollama_request(&request, true);
        let span = chat_span("ollama", &self.model_code, body.options.temperature, true);
        let builder = self.client.post(self.url()).json(&body);
        let model = self.descriptor.id.clone();
        let line_model = model.clone();

        let raw: TextStream = Box::pin(async_stream::try_stream! {
            let response = send(builder).instrument(span).await?;
            let mut body = response.bytes_stream();
            let mut lines = LineBuffer::default();

            while let Some(chunk) = body.next().await {
                let chunk = chunk.map_err(|e| LlmError::Stream(format!("response body read: {e}")))?;
                for line in lines.push(&chunk) {
                    if let Some(fragment) = parse_line(&line_model, &line)? {
                        yield fragment;
                    }
                }
            }
            if let Some(line) = lines.finish() {
                if let Some(fragment) = parse_line(&line_model, &line)? {
                    yield fragment;
                }
            }
        });

        settle_stream(model, raw)
    }
}
