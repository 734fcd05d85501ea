//! BoxLlmProvider -- object-safe dynamic dispatch wrapper for LlmProvider.
//!
//! 1. Define an object-safe `LlmProviderDyn` trait with boxed futures
//! 2. Blanket-impl `LlmProviderDyn` for all `T: LlmProvider`
//! 3. `BoxLlmProvider` wraps `Box<dyn LlmProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use scribe_types::llm::{CapabilityDescriptor, InvocationRequest, LlmError, ProviderKind};

use super::provider::{LlmProvider, TextStream};

/// Object-safe version of [`LlmProvider`] with boxed futures.
pub trait LlmProviderDyn: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn descriptor(&self) -> &CapabilityDescriptor;

    fn invoke_boxed<'a>(
        &'a self,
        request: &'a InvocationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;

    fn stream_boxed(&self, request: InvocationRequest) -> TextStream;
}

/// Blanket implementation: any `LlmProvider` automatically implements `LlmProviderDyn`.
impl<T: LlmProvider> LlmProviderDyn for T {
    fn kind(&self) -> ProviderKind {
        LlmProvider::kind(self)
    }

    fn descriptor(&self) -> &CapabilityDescriptor {
        LlmProvider::descriptor(self)
    }

    fn invoke_boxed<'a>(
        &'a self,
        request: &'a InvocationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(self.invoke(request))
    }

    fn stream_boxed(&self, request: InvocationRequest) -> TextStream {
        self.stream(request)
    }
}

/// Type-erased LLM provider, as stored in the [`ModelRegistry`](super::registry::ModelRegistry).
///
/// Since `LlmProvider` uses RPITIT, it cannot be used as a trait object directly.
/// `BoxLlmProvider` provides equivalent methods that delegate to the inner
/// `LlmProviderDyn` trait object.
pub struct BoxLlmProvider {
    inner: Box<dyn LlmProviderDyn + Send + Sync>,
}

impl BoxLlmProvider {
    /// Wrap a concrete `LlmProvider` in a type-erased box.
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.inner.kind()
    }

    pub fn descriptor(&self) -> &CapabilityDescriptor {
        self.inner.descriptor()
    }

    /// Send a request and receive the complete response text.
    pub async fn invoke(&self, request: &InvocationRequest) -> Result<String, LlmError> {
        self.inner.invoke_boxed(request).await
    }

    /// Send a request and receive the response incrementally.
    pub fn stream(&self, request: InvocationRequest) -> TextStream {
        self.inner.stream_boxed(request)
    }
}
