//! OpenAI chat-completions provider.
//!
//! Uses [`async_openai`] for type-safe request/response handling and
//! built-in SSE streaming. Serves the hosted GPT-4 / GPT-4o / o1 family.

use async_openai::Client;
use async_openai::config::{OPENAI_API_BASE, OpenAIConfig};
use async_openai::types::chat::{
    ChatCompletionRequestAssistantMessage, ChatCompletionRequestAssistantMessageContent,
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
    ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
    CreateChatCompletionRequest, ImageUrl, ResponseFormat,
};
use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use tracing::Instrument;

use scribe_core::llm::provider::{LlmProvider, TextStream};
use scribe_core::llm::turns::{Turn, conversation_turns};
use scribe_observe::spans::chat_span;
use scribe_types::llm::{CapabilityDescriptor, InvocationRequest, LlmError, MessageRole, ProviderKind};

use super::http::settle_stream;

/// OpenAI provider for one hosted model.
///
/// Does NOT derive Debug: the API key lives inside the `async_openai::Client`.
pub struct OpenAiProvider {
    client: Client<OpenAIConfig>,
    model_code: String,
    descriptor: CapabilityDescriptor,
}

impl OpenAiProvider {
    pub fn new(
        api_key: &SecretString,
        model_code: impl Into<String>,
        descriptor: CapabilityDescriptor,
    ) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(OPENAI_API_BASE)
            .with_api_key(api_key.expose_secret());
        Self {
            client: Client::with_config(config),
            model_code: model_code.into(),
            descriptor,
        }
    }

    /// Send requests to `api_base` (the URL up to and including `/v1`).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        let config = self.client.config().clone().with_api_base(api_base);
        self.client = Client::with_config(config);
        self
    }

    /// Build a [`CreateChatCompletionRequest`] from a generic [`InvocationRequest`].
    fn build_request(&self, request: &InvocationRequest, stream: bool) -> CreateChatCompletionRequest {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(request.history.len() * 2 + 2);

        // Always present, even when empty.
        messages.push(ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(
                    request.system_prompt.clone().unwrap_or_default(),
                ),
                name: None,
            },
        ));

        messages.extend(
            conversation_turns(request, self.descriptor.accepts_images)
                .into_iter()
                .map(to_openai_message),
        );

        let want_json = request.want_json && self.descriptor.supports_json;
        CreateChatCompletionRequest {
            model: self.model_code.clone(),
            messages,
            temperature: Some(request.effective_temperature() as f32),
            response_format: want_json.then_some(ResponseFormat::JsonObject),
            stream: stream.then_some(true),
            ..Default::default()
        }
    }
}

fn to_openai_message(turn: Turn<'_>) -> ChatCompletionRequestMessage {
    match turn.role {
        MessageRole::Assistant => {
            #[allow(deprecated)]
            ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                content: Some(ChatCompletionRequestAssistantMessageContent::Text(
                    turn.text.to_string(),
                )),
                refusal: None,
                name: None,
                audio: None,
                tool_calls: None,
                function_call: None,
            })
        }
        MessageRole::System => ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(turn.text.to_string()),
            name: None,
        }),
        MessageRole::User => {
            let content = if turn.is_multimodal() {
                let mut parts = vec![ChatCompletionRequestUserMessageContentPart::Text(
                    ChatCompletionRequestMessageContentPartText {
                        text: turn.text.to_string(),
                    },
                )];
                parts.extend(turn.images.iter().map(|image| {
                    ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImage {
                            image_url: ImageUrl {
                                url: image.to_data_url(),
                                detail: None,
                            },
                        },
                    )
                }));
                ChatCompletionRequestUserMessageContent::Array(parts)
            } else {
                ChatCompletionRequestUserMessageContent::Text(turn.text.to_string())
            };
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content,
                name: None,
            })
        }
    }
}

impl LlmProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn descriptor(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, request: &InvocationRequest) -> Result<String, LlmError> {
        request.validate()?;
        let oai_request = self.build_request(request, false);
        let span = chat_span("openai", &self.model_code, request.effective_temperature(), false);

        async {
            let response = self
                .client
                .chat()
                .create(oai_request)
                .await
                .map_err(map_openai_error)?;

            Ok::<_, LlmError>(
                response
                    .choices
                    .first()
                    .and_then(|c| c.message.content.clone())
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

        let oai_request = self.build_request(&request, true);
        let span = chat_span("openai", &self.model_code, request.effective_temperature(), true);
        // Clone the client for the 'static stream closure
        let client = self.client.clone();

        let raw: TextStream = Box::pin(async_stream::try_stream! {
            let mut oai_stream = client
                .chat()
                .create_stream(oai_request)
                .instrument(span)
                .await
                .map_err(map_openai_error)?;

            while let Some(chunk) = oai_stream.next().await {
                let chunk = chunk.map_err(map_openai_error)?;
                for choice in chunk.choices {
                    if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
                        yield text;
                    }
                }
            }
        });

        settle_stream(self.descriptor.id.clone(), raw)
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "invalid_api_key"
                || error_type == "authentication_error"
                || api_err.message.contains("Incorrect API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "rate_limit_exceeded" || error_type == "rate_limit_error" {
                LlmError::RateLimited {
                    retry_after_ms: None,
                }
            } else if code == "model_not_found" {
                LlmError::InvalidRequest(api_err.message.clone())
            } else if code == "server_error" || error_type == "overloaded_error" {
                LlmError::Overloaded(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401 | 403) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited {
                retry_after_ms: None,
            },
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::StreamError(stream_err) => LlmError::Stream(stream_err.to_string()),
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}
