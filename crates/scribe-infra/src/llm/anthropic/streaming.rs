//! SSE stream handling for the Anthropic Messages API.
//!
//! The streaming protocol:
//! 1. `message_start` -- message object with initial usage
//! 2. Per block: `content_block_start` -> N x `content_block_delta` -> `content_block_stop`
//! 3. `message_delta` -- stop_reason and cumulative usage
//! 4. `message_stop` -- final event
//! 5. `ping` events may appear anywhere (keepalive)
//! 6. `error` events may appear mid-stream
//!
//! Only `text_delta` deltas carry caller-visible text.

use futures_util::StreamExt;
use reqwest_eventsource::{Error as SseError, Event, EventSource};

use scribe_core::llm::provider::TextStream;
use scribe_types::llm::LlmError;

use super::types::{AnthropicDelta, AnthropicError, ContentBlockDeltaPayload, ErrorPayload};
use crate::llm::http::error_from_response;

/// Map an in-band `error` event to an [`LlmError`].
pub fn map_stream_error(error: AnthropicError) -> LlmError {
    match error.error_type.as_str() {
        "authentication_error" | "permission_error" => LlmError::AuthenticationFailed,
        "rate_limit_error" => LlmError::RateLimited {
            retry_after_ms: None,
        },
        "overloaded_error" => LlmError::Overloaded(error.message),
        "invalid_request_error" => LlmError::InvalidRequest(error.message),
        _ => LlmError::Provider {
            message: format!("{}: {}", error.error_type, error.message),
        },
    }
}

/// Open an SSE connection for a prepared `POST /v1/messages` request and
/// yield the text of every `text_delta`.
///
/// The raw stream reports every error as an item; the caller applies the
/// early/late failure policy on top.
pub fn create_anthropic_stream(builder: reqwest::RequestBuilder, model: String) -> TextStream {
    Box::pin(async_stream::try_stream! {
        let mut source = EventSource::new(builder).map_err(|e| LlmError::Provider {
            message: format!("failed to open event stream: {e}"),
        })?;
        // No reconnects: a dropped connection ends the response.
        source.set_retry_policy(Box::new(reqwest_eventsource::retry::Never));

        while let Some(event) = source.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(message)) => match message.event.as_str() {
                    "content_block_delta" => {
                        match serde_json::from_str::<ContentBlockDeltaPayload>(&message.data) {
                            Ok(payload) => {
                                if let AnthropicDelta::TextDelta { text } = payload.delta {
                                    if !text.is_empty() {
                                        yield text;
                                    }
                                }
                            }
                            Err(e) => {
                                tracing::warn!(model = %model, error = %e, "skipping malformed content_block_delta");
                            }
                        }
                    }
                    "message_stop" => break,
                    "error" => {
                        let err = serde_json::from_str::<ErrorPayload>(&message.data)
                            .map(|payload| map_stream_error(payload.error))
                            .unwrap_or_else(|_| LlmError::Stream(message.data.clone()));
                        source.close();
                        Err::<(), _>(err)?;
                    }
                    other => {
                        tracing::trace!(model = %model, event = other, "ignoring stream event");
                    }
                },
                Err(SseError::StreamEnded) => break,
                Err(SseError::InvalidStatusCode(_, response)) => {
                    source.close();
                    Err::<(), _>(error_from_response(response).await)?;
                }
                Err(SseError::InvalidContentType(content_type, _)) => {
                    source.close();
                    Err::<(), _>(LlmError::Provider {
                        message: format!("unexpected content type: {content_type:?}"),
                    })?;
                }
                Err(e) => {
                    source.close();
                    Err::<(), _>(LlmError::Stream(e.to_string()))?;
                }
            }
        }
        source.close();
    })
}
