//! AnthropicProvider -- concrete [`LlmProvider`] implementation for Anthropic Claude.
//!
//! Sends requests to the Anthropic Messages API (`/v1/messages`) with
//! proper authentication headers. Supports both non-streaming (`invoke`)
//! and streaming (`stream`) modes.
//!
//! The Messages API has no JSON output flag, so JSON mode prefills the
//! assistant turn with [`JSON_SEED`] and puts the seed back on the result.

use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use scribe_core::llm::json_seed::{JSON_SEED, reattach_seed, seeded_stream};
use scribe_core::llm::provider::{LlmProvider, TextStream};
use scribe_core::llm::turns::conversation_turns;
use scribe_observe::spans::chat_span;
use scribe_types::llm::{CapabilityDescriptor, InvocationRequest, LlmError, MessageRole, ProviderKind};

use super::streaming::create_anthropic_stream;
use super::types::{
    AnthropicContent, AnthropicMessage, AnthropicNonStreamResponse, AnthropicRequest,
    AnthropicRequestBlock, ImageSource,
};
use crate::llm::http::{build_client, send, settle_stream};

/// Anthropic Claude LLM provider.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing HTTP request headers. It never appears in Debug output,
/// Display output, or tracing logs.
pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model_code: String,
    descriptor: CapabilityDescriptor,
}

impl AnthropicProvider {
    /// The Anthropic API version header value.
    const API_VERSION: &'static str = "2023-06-01";

    /// Output cap sent with every request.
    const MAX_TOKENS: u32 = 4096;

    /// Create a new Anthropic provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Anthropic API key wrapped in SecretString
    /// * `model_code` - Backend model name (e.g., "claude-3-5-sonnet-20240620")
    /// * `descriptor` - Catalog entry the registry files this adapter under
    pub fn new(
        api_key: SecretString,
        model_code: impl Into<String>,
        descriptor: CapabilityDescriptor,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_client()?,
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
            model_code: model_code.into(),
            descriptor,
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the full API URL for a given path.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn wants_json(&self, request: &InvocationRequest) -> bool {
        request.want_json && self.descriptor.supports_json
    }

    /// Convert a generic [`InvocationRequest`] into an [`AnthropicRequest`].
    fn to_anthropic_request(&self, request: &InvocationRequest, stream: bool) -> AnthropicRequest {
        let mut messages: Vec<AnthropicMessage> = conversation_turns(request, self.descriptor.accepts_images)
            .into_iter()
            .map(|turn| {
                let content = if turn.is_multimodal() {
                    let mut blocks = vec![AnthropicRequestBlock::Text {
                        text: turn.text.to_string(),
                    }];
                    blocks.extend(turn.images.iter().map(|image| AnthropicRequestBlock::Image {
                        source: ImageSource::base64(image.media_type(), image.base64_payload()),
                    }));
                    AnthropicContent::Blocks(blocks)
                } else {
                    AnthropicContent::Text(turn.text.to_string())
                };
                AnthropicMessage {
                    role: turn.role.as_str().to_string(),
                    content,
                }
            })
            .collect();

        if self.wants_json(request) {
            messages.push(AnthropicMessage {
                role: MessageRole::Assistant.as_str().to_string(),
                content: AnthropicContent::Text(JSON_SEED.to_string()),
            });
        }

        AnthropicRequest {
            model: self.model_code.clone(),
            max_tokens: Self::MAX_TOKENS,
            messages,
            system: request.system_prompt.clone().unwrap_or_default(),
            stream,
            temperature: request.effective_temperature(),
        }
    }

    fn request_builder(&self, body: &AnthropicRequest) -> reqwest::RequestBuilder {
        self.client
            .post(self.url("/v1/messages"))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(body)
    }
}

// AnthropicProvider intentionally does NOT derive Debug; it holds the API key.

impl LlmProvider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, request: &InvocationRequest) -> Result<String, LlmError> {
        request.validate()?;
        let body = self.to_anthropic_request(request, false);
        let span = chat_span("anthropic", &self.model_code, body.temperature, false);
        let want_json = self.wants_json(request);

        async {
            let response = send(self.request_builder(&body)).await?;
            let anthropic_resp: AnthropicNonStreamResponse = response.json().await.map_err(|e| {
                LlmError::Deserialization(format!("failed to parse response: {e}"))
            })?;

            let text = anthropic_resp.text();
            Ok::<_, LlmError>(if want_json {
                reattach_seed(JSON_SEED, &text)
            } else {
                text
            })
        }
        .instrument(span)
        .await
    }

    fn stream(&self, request: InvocationRequest) -> TextStream {
        if let Err(e) = request.validate() {
            return Box::pin(futures_util::stream::once(async move { Err(e) }));
        }

        let body = self.to_anthropic_request(&request, true);
        let span = chat_span("anthropic", &self.model_code, body.temperature, true);
        let model = self.descriptor.id.clone();

        let raw = {
            let _entered = span.enter();
            tracing::debug!(messages = body.messages.len(), "opening message stream");
            create_anthropic_stream(self.request_builder(&body), model.clone())
        };
        let raw = if self.wants_json(&request) {
            seeded_stream(JSON_SEED, raw)
        } else {
            raw
        };

        settle_stream(model, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::catalog::PRIMARY_MODELS;
    use crate::llm::test_support::{Captured, dead_url, descriptor, serve};
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode, header};
    use axum::response::{IntoResponse, Response};
    use axum::routing::post;
    use axum::{Json, Router};
    use futures_util::StreamExt;
    use scribe_types::image::ImageData;
    use scribe_types::llm::ConversationRound;

    fn sse(events: &[(&str, serde_json::Value)]) -> String {
        events
            .iter()
            .map(|(name, data)| format!("event: {name}\ndata: {data}\n\n"))
            .collect()
    }

    fn delta(text: &str) -> (&'static str, serde_json::Value) {
        (
            "content_block_delta",
            serde_json::json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": text}}),
        )
    }

    fn stream_body(fragments: &[&str]) -> String {
        let mut events = vec![
            (
                "message_start",
                serde_json::json!({"type": "message_start", "message": {"id": "msg_1", "model": "claude"}}),
            ),
            (
                "content_block_start",
                serde_json::json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
            ),
            ("ping", serde_json::json!({"type": "ping"})),
        ];
        events.extend(fragments.iter().map(|f| delta(f)));
        events.push((
            "message_stop",
            serde_json::json!({"type": "message_stop"}),
        ));
        sse(&events)
    }

    /// Mock that answers with `reply` split into the given fragments.
    fn router(captured: Captured, fragments: &'static [&'static str]) -> Router {
        let handler = move |State(captured): State<Captured>,
                            headers: HeaderMap,
                            Json(mut body): Json<serde_json::Value>| async move {
            let streaming = body["stream"].as_bool().unwrap_or(false);
            for name in ["x-api-key", "anthropic-version"] {
                let value = headers
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                body[format!("_{name}")] = serde_json::Value::String(value);
            }
            captured.push(body);

            let response: Response = if streaming {
                (
                    [(header::CONTENT_TYPE, "text/event-stream")],
                    stream_body(fragments),
                )
                    .into_response()
            } else {
                Json(serde_json::json!({
                    "id": "msg_1",
                    "model": "claude",
                    "content": [{"type": "text", "text": fragments.concat()}],
                    "stop_reason": "end_turn"
                }))
                .into_response()
            };
            response
        };
        Router::new()
            .route("/v1/messages", post(handler))
            .with_state(captured)
    }

    async fn mock(fragments: &'static [&'static str]) -> (String, Captured) {
        let captured = Captured::default();
        let url = serve(router(captured.clone(), fragments)).await;
        (url, captured)
    }

    fn provider(url: &str) -> AnthropicProvider {
        AnthropicProvider::new(
            SecretString::from("test-key-not-real"),
            "claude-3-opus-latest",
            descriptor("claude-3-opus", 128_000, true),
        )
        .unwrap()
        .with_base_url(url)
    }

    #[test]
    fn test_provider_matches_catalog_entry() {
        let entry = PRIMARY_MODELS.iter().find(|m| m.id == "claude-3-opus").unwrap();
        let provider = provider("http://localhost:8080");
        assert_eq!(provider.descriptor().context_length, entry.descriptor().context_length);
        assert_eq!(provider.descriptor().context_length, 128_000);
        assert_eq!(provider.model_code, entry.model_code);
    }

    #[test]
    fn test_base_url_override() {
        let provider = provider("http://localhost:8080/");
        assert_eq!(provider.url("/v1/messages"), "http://localhost:8080/v1/messages");
    }

    #[tokio::test]
    async fn test_stream_concatenation_equals_invoke() {
        let (url, _) = mock(&["Hello", ", ", "world"]).await;
        let provider = provider(&url);
        let request = InvocationRequest::new("greet me");

        let full = provider.invoke(&request).await.unwrap();
        let fragments: Vec<String> = provider
            .stream(request)
            .map(|item| item.unwrap())
            .collect()
            .await;
        assert_eq!(fragments, vec!["Hello", ", ", "world"]);
        assert_eq!(fragments.concat(), full);
    }

    #[tokio::test]
    async fn test_request_shape() {
        let (url, captured) = mock(&["ok"]).await;
        let jpeg = ImageData::new("image/jpeg", vec![0xff, 0xd8]).unwrap();
        let request = InvocationRequest::new("what is in the picture?")
            .with_system_prompt("You are terse.")
            .with_history(vec![ConversationRound::new("hi", "hello")])
            .with_images(vec![jpeg.clone()])
            .with_temperature(0.3);

        provider(&url).invoke(&request).await.unwrap();
        let body = captured.last();
        assert_eq!(body["_x-api-key"], "test-key-not-real");
        assert_eq!(body["_anthropic-version"], "2023-06-01");
        assert_eq!(body["model"], "claude-3-opus-latest");
        assert_eq!(body["max_tokens"], 4096);
        assert_eq!(body["system"], "You are terse.");
        assert_eq!(body["temperature"], 0.3);

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["content"], "hi");
        assert_eq!(messages[1]["role"], "assistant");
        let blocks = messages[2]["content"].as_array().unwrap();
        assert_eq!(blocks[0]["text"], "what is in the picture?");
        assert_eq!(blocks[1]["source"]["media_type"], "image/jpeg");
        assert_eq!(blocks[1]["source"]["data"], jpeg.base64_payload());
    }

    #[tokio::test]
    async fn test_missing_system_prompt_sent_empty() {
        let (url, captured) = mock(&["ok"]).await;
        provider(&url).invoke(&InvocationRequest::new("hi")).await.unwrap();
        assert_eq!(captured.last()["system"], "");
    }

    #[tokio::test]
    async fn test_json_mode_prefills_and_reattaches_seed() {
        let (url, captured) = mock(&["answer", "\": 42}"]).await;
        let provider = provider(&url);
        let request = InvocationRequest::new("reply in JSON").with_json(true);

        let full = provider.invoke(&request).await.unwrap();
        assert_eq!(full, "{\"answer\": 42}");
        let body = captured.last();
        let messages = body["messages"].as_array().unwrap();
        let last = messages.last().unwrap();
        assert_eq!(last["role"], "assistant");
        assert_eq!(last["content"], "{\"");

        let streamed: String = provider
            .stream(request)
            .map(|item| item.unwrap())
            .collect::<Vec<_>>()
            .await
            .concat();
        assert_eq!(streamed, full);
    }

    #[tokio::test]
    async fn test_json_mode_echoed_seed_not_duplicated() {
        let (url, _) = mock(&["{\"", "k\": true}"]).await;
        let provider = provider(&url);
        let request = InvocationRequest::new("reply in JSON").with_json(true);

        assert_eq!(provider.invoke(&request).await.unwrap(), "{\"k\": true}");
        let streamed: String = provider
            .stream(request)
            .map(|item| item.unwrap())
            .collect::<Vec<_>>()
            .await
            .concat();
        assert_eq!(streamed, "{\"k\": true}");
    }

    #[tokio::test]
    async fn test_overloaded_status() {
        let router = Router::new().route(
            "/v1/messages",
            post(|| async { (StatusCode::from_u16(529).unwrap(), "overloaded") }),
        );
        let url = serve(router).await;
        let provider = provider(&url);

        assert!(matches!(
            provider.invoke(&InvocationRequest::new("hi")).await,
            Err(LlmError::Overloaded(_))
        ));
        let items: Vec<_> = provider.stream(InvocationRequest::new("hi")).collect().await;
        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(LlmError::Overloaded(_))));
    }

    #[tokio::test]
    async fn test_error_event_after_text_keeps_partial() {
        let body = sse(&[
            delta("partial"),
            (
                "error",
                serde_json::json!({"type": "error", "error": {"type": "overloaded_error", "message": "busy"}}),
            ),
            delta("lost"),
        ]);
        let router = Router::new().route(
            "/v1/messages",
            post(move || {
                let body = body.clone();
                async move { ([(header::CONTENT_TYPE, "text/event-stream")], body) }
            }),
        );
        let url = serve(router).await;

        let items: Vec<_> = provider(&url).stream(InvocationRequest::new("hi")).collect().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), "partial");
    }

    #[tokio::test]
    async fn test_connection_refused_is_single_error() {
        let items: Vec<_> = provider(&dead_url().await)
            .stream(InvocationRequest::new("hi"))
            .collect()
            .await;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }
}
