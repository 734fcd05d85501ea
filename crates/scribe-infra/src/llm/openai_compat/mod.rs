//! Adapter for self-hosted servers exposing an OpenAI-compatible API
//! (vLLM, LM Studio, llama.cpp server and friends).
//!
//! Posts to `{base}/v1/chat/completions`. Streaming responses are SSE:
//! each `data:` event carries one JSON chunk and `data: [DONE]` ends the
//! stream. Events that fail to parse are skipped.

pub mod types;

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use scribe_core::llm::provider::{LlmProvider, TextStream};
use scribe_core::llm::turns::conversation_turns;
use scribe_observe::spans::chat_span;
use scribe_types::llm::{CapabilityDescriptor, InvocationRequest, LlmError, MessageRole, ProviderKind};

use self::types::{
    CompatChatRequest, CompatChatResponse, CompatContent, CompatImageUrl, CompatMessage,
    CompatPart, CompatStreamChunk, ResponseFormat,
};
use super::http::{build_client, send, settle_stream};

/// SSE payload that terminates a stream.
const DONE_MARKER: &str = "[DONE]";

/// Adapter for one model behind an OpenAI-compatible endpoint.
///
/// Does not derive Debug: it holds the endpoint's API key.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    model_code: String,
    descriptor: CapabilityDescriptor,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        base_url: &str,
        api_key: Option<SecretString>,
        model_code: impl Into<String>,
        descriptor: CapabilityDescriptor,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model_code: model_code.into(),
            descriptor,
        })
    }

    fn request_builder(&self, body: &CompatChatRequest) -> reqwest::RequestBuilder {
        let builder = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(body);
        match &self.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    fn to_compat_request(&self, request: &InvocationRequest, stream: bool) -> CompatChatRequest {
        let mut messages = Vec::with_capacity(request.history.len() * 2 + 2);
        messages.push(CompatMessage {
            role: MessageRole::System.as_str().to_string(),
            content: CompatContent::Text(request.system_prompt.clone().unwrap_or_default()),
        });

        for turn in conversation_turns(request, self.descriptor.accepts_images) {
            let content = if turn.is_multimodal() {
                let mut parts = vec![CompatPart::Text {
                    text: turn.text.to_string(),
                }];
                parts.extend(turn.images.iter().map(|image| CompatPart::ImageUrl {
                    image_url: CompatImageUrl {
                        url: image.to_data_url(),
                    },
                }));
                CompatContent::Parts(parts)
            } else {
                CompatContent::Text(turn.text.to_string())
            };
            messages.push(CompatMessage {
                role: turn.role.as_str().to_string(),
                content,
            });
        }

        let want_json = request.want_json && self.descriptor.supports_json;
        CompatChatRequest {
            model: self.model_code.clone(),
            messages,
            temperature: request.effective_temperature(),
            stream,
            response_format: want_json.then(ResponseFormat::json_object),
        }
    }
}

/// Decode one SSE payload into its text fragment, skipping bad events.
fn parse_event(model: &str, data: &str) -> Option<String> {
    match serde_json::from_str::<CompatStreamChunk>(data) {
        Ok(chunk) => chunk
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty()),
        Err(e) => {
            tracing::warn!(model, error = %e, "skipping malformed stream event");
            None
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAiCompatible
    }

    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, request: &InvocationRequest) -> Result<String, LlmError> {
        request.validate()?;
        let body = self.to_compat_request(request, false);
        let span = chat_span("openai_compatible", &self.model_code, body.temperature, false);

        async {
            let response = send(self.request_builder(&body)).await?;
            let parsed: CompatChatResponse = response
                .json()
                .await
                .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;
            Ok::<_, LlmError>(
                parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.message.content)
                    .unwrap_or_default(),
            )
        }
        .instrument(span)
        .await
    }

    fn stream(&self, request: InvocationRequest) -> TextStream {
        if let Err(e) = request.validate() {
            return Box::pin(futures_util::stream::once(async move { Err(e) }));
        }

        let body = self.to_compat_request(&request, true);
        let span = chat_span("openai_compatible", &self.model_code, body.temperature, true);
        let builder = self.request_builder(&body);
        let model = self.descriptor.id.clone();
        let event_model = model.clone();

        let raw: TextStream = Box::pin(async_stream::try_stream! {
            let response = send(builder).instrument(span).await?;
            let mut events = response.bytes_stream().eventsource();

            while let Some(event) = events.next().await {
                let event = event.map_err(|e| LlmError::Stream(e.to_string()))?;
                let data = event.data.trim();
                if data == DONE_MARKER {
                    break;
                }
                if let Some(fragment) = parse_event(&event_model, data) {
                    yield fragment;
                }
            }
        });

        settle_stream(model, raw)
    }
}
