//! HTTP plumbing shared by the network-backed adapters.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest::StatusCode;

use scribe_core::llm::provider::TextStream;
use scribe_types::llm::LlmError;

/// Upper bound for one generation, streamed or not.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Build the client every adapter uses.
pub(crate) fn build_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| LlmError::Provider {
            message: format!("failed to create HTTP client: {e}"),
        })
}

/// Map a non-2xx response to an [`LlmError`].
pub(crate) fn status_error(status: StatusCode, retry_after_ms: Option<u64>, body: String) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited { retry_after_ms },
        529 => LlmError::Overloaded(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

/// `Retry-After` in milliseconds, when given in seconds.
fn retry_after_ms(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs * 1_000)
}

/// Turn an error response into an [`LlmError`], consuming its body.
pub(crate) async fn error_from_response(response: reqwest::Response) -> LlmError {
    let status = response.status();
    let retry_after = retry_after_ms(&response);
    let body = response.text().await.unwrap_or_default();
    status_error(status, retry_after, body)
}

/// Send a request and fail on any non-2xx status.
pub(crate) async fn send(builder: reqwest::RequestBuilder) -> Result<reqwest::Response, LlmError> {
    let response = builder.send().await.map_err(|e| LlmError::Provider {
        message: format!("HTTP request failed: {e}"),
    })?;
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_response(response).await)
    }
}

/// Apply the streaming failure policy to a raw fragment stream.
///
/// An error before the first fragment (connect failure, non-2xx status) is
/// yielded as the stream's only item. An error after text has started
/// flowing is logged and ends the stream, so callers keep the partial text.
pub(crate) fn settle_stream(model: String, inner: TextStream) -> TextStream {
    Box::pin(async_stream::stream! {
        let mut inner = inner;
        let mut started = false;
        while let Some(item) = inner.next().await {
            match item {
                Ok(fragment) => {
                    started = true;
                    yield Ok(fragment);
                }
                Err(e) if !started => {
                    yield Err(e);
                    break;
                }
                Err(e) => {
                    tracing::warn!(model = %model, error = %e, "stream failed mid-response, ending early");
                    break;
                }
            }
        }
    })
}
