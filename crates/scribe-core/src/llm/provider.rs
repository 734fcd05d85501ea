//! LlmProvider trait definition.
//!
//! This is the uniform invocation contract every backend adapter implements.
//! Uses RPITIT for `invoke` and `Pin<Box<dyn Stream>>` for `stream` (streams
//! need to be object-safe for the BoxLlmProvider wrapper).

use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;

use scribe_types::llm::{CapabilityDescriptor, InvocationRequest, LlmError, ProviderKind};

/// A lazily pulled sequence of response fragments.
///
/// Concatenating every `Ok` item yields the full response text. Dropping the
/// stream early releases the underlying connection.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>>;

/// Trait for LLM provider backends (OpenAI, Anthropic, Ollama, ...).
///
/// `invoke` and `stream` have default bodies that fail with
/// [`LlmError::NotImplemented`], so an adapter that only supports one mode
/// fails fast on the other instead of silently misbehaving.
///
/// Implementations live in scribe-infra (e.g., `AnthropicProvider`).
pub trait LlmProvider: Send + Sync {
    /// Which wire-protocol family this adapter speaks.
    fn kind(&self) -> ProviderKind;

    /// Static metadata for the model this adapter serves.
    fn descriptor(&self) -> &CapabilityDescriptor;

    /// Send a request and receive the complete response text.
    fn invoke(
        &self,
        request: &InvocationRequest,
    ) -> impl Future<Output = Result<String, LlmError>> + Send {
        let _ = request;
        let err = not_implemented(self.descriptor(), "invoke");
        async move { Err(err) }
    }

    /// Send a request and receive the response incrementally.
    fn stream(&self, request: InvocationRequest) -> TextStream {
        let _ = request;
        let err = not_implemented(self.descriptor(), "stream");
        Box::pin(futures_util::stream::once(async move { Err(err) }))
    }
}

/// The error an adapter returns for an operation it does not support.
pub fn not_implemented(descriptor: &CapabilityDescriptor, operation: &'static str) -> LlmError {
    LlmError::NotImplemented {
        model: descriptor.id.clone(),
        operation,
    }
}
