//! Model registry for runtime model lookup.
//!
//! The registry is assembled once at startup through [`ModelRegistryBuilder`]
//! and is read-only afterwards: there is no way to add or remove a model from
//! a built [`ModelRegistry`]. Share it behind an `Arc`; concurrent lookups need
//! no synchronization.

use std::collections::HashMap;

use scribe_types::llm::{CapabilityDescriptor, InvocationRequest, LlmError};

use super::box_provider::BoxLlmProvider;
use super::budget::safe_retrieval_budget;
use super::provider::TextStream;

/// Immutable catalog of models, indexed by model id.
pub struct ModelRegistry {
    models: HashMap<String, BoxLlmProvider>,
    /// Registration order, used when listing the catalog.
    order: Vec<String>,
}

impl ModelRegistry {
    /// Start building a registry.
    pub fn builder() -> ModelRegistryBuilder {
        ModelRegistryBuilder::default()
    }

    /// Look up a model by id.
    pub fn get(&self, id: &str) -> Result<&BoxLlmProvider, LlmError> {
        self.models
            .get(id)
            .ok_or_else(|| LlmError::UnknownModel(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// Descriptor of a model.
    pub fn descriptor(&self, id: &str) -> Result<&CapabilityDescriptor, LlmError> {
        self.get(id).map(BoxLlmProvider::descriptor)
    }

    /// All descriptors, in registration order.
    pub fn catalog(&self) -> Vec<&CapabilityDescriptor> {
        self.order
            .iter()
            .filter_map(|id| self.models.get(id))
            .map(BoxLlmProvider::descriptor)
            .collect()
    }

    /// Safe retrieval budget for a model (see [`super::budget`]).
    pub fn safe_budget(&self, id: &str) -> Result<u32, LlmError> {
        self.descriptor(id)
            .map(|d| safe_retrieval_budget(d.context_length))
    }

    /// Resolve `id` and invoke it.
    pub async fn invoke(&self, id: &str, request: &InvocationRequest) -> Result<String, LlmError> {
        let provider = self.get(id)?;
        tracing::debug!(model = id, provider = %provider.kind(), "invoking model");
        provider.invoke(request).await
    }

    /// Resolve `id` and stream from it. An unknown id yields a single error item.
    pub fn stream(&self, id: &str, request: InvocationRequest) -> TextStream {
        match self.get(id) {
            Ok(provider) => {
                tracing::debug!(model = id, provider = %provider.kind(), "streaming model");
                provider.stream(request)
            }
            Err(e) => Box::pin(futures_util::stream::once(async move { Err(e) })),
        }
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Collects adapters before the registry is frozen.
#[derive(Default)]
pub struct ModelRegistryBuilder {
    models: HashMap<String, BoxLlmProvider>,
    order: Vec<String>,
}

impl ModelRegistryBuilder {
    /// Register an adapter under its descriptor id.
    ///
    /// A later registration with the same id replaces the earlier one and
    /// keeps the original catalog position.
    pub fn register(mut self, provider: BoxLlmProvider) -> Self {
        let id = provider.descriptor().id.clone();
        if self.models.insert(id.clone(), provider).is_some() {
            tracing::warn!(model = %id, "duplicate model id, replacing earlier registration");
        } else {
            self.order.push(id);
        }
        self
    }

    /// Register every adapter in `providers`.
    pub fn register_all(self, providers: impl IntoIterator<Item = BoxLlmProvider>) -> Self {
        providers.into_iter().fold(self, Self::register)
    }

    /// Freeze the registry.
    pub fn build(self) -> ModelRegistry {
        ModelRegistry {
            models: self.models,
            order: self.order,
        }
    }
}
