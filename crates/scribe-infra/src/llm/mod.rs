//! LLM provider implementations.
//!
//! Contains the concrete [`LlmProvider`](scribe_core::llm::provider::LlmProvider)
//! adapters, one per wire dialect, and the startup code that turns
//! [`ProviderSettings`] into a populated [`ModelRegistry`].

pub mod anthropic;
pub mod catalog;
pub(crate) mod http;
pub(crate) mod lines;
pub mod ollama;
pub mod openai;
pub mod openai_compat;
pub mod probe;

#[cfg(test)]
pub(crate) mod test_support;

use secrecy::SecretString;

use scribe_core::llm::box_provider::BoxLlmProvider;
use scribe_core::llm::registry::{ModelRegistry, ModelRegistryBuilder};
use scribe_types::config::ProviderSettings;
use scribe_types::llm::{LlmError, ProviderKind};

use self::anthropic::AnthropicProvider;
use self::catalog::{HostedModel, PREVIEW_MODELS, PRIMARY_MODELS, compatible_descriptor, ollama_descriptor};
use self::ollama::OllamaProvider;
use self::openai::OpenAiProvider;
use self::openai_compat::OpenAiCompatibleProvider;

/// Credentials and endpoint overrides for the hosted families, resolved once.
#[derive(Default)]
pub struct HostedKeys {
    pub openai: Option<SecretString>,
    pub openai_base_url: Option<String>,
    pub anthropic: Option<SecretString>,
}

impl HostedKeys {
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self {
            openai: secret(&settings.openai_api_key),
            openai_base_url: non_empty(&settings.openai_base_url).map(str::to_string),
            anthropic: secret(&settings.anthropic_api_key),
        }
    }
}

fn secret(value: &Option<String>) -> Option<SecretString> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| SecretString::from(v.to_string()))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Create the adapter for a hosted catalog entry.
///
/// `Ok(None)` when the entry's provider family has no credential configured.
pub fn create_hosted_provider(model: &HostedModel, keys: &HostedKeys) -> Result<Option<BoxLlmProvider>, LlmError> {
    let provider = match model.kind {
        ProviderKind::OpenAi => keys.openai.as_ref().map(|key| {
            let provider = OpenAiProvider::new(key, model.model_code, model.descriptor());
            match &keys.openai_base_url {
                Some(base) => BoxLlmProvider::new(provider.with_api_base(base.trim_end_matches('/'))),
                None => BoxLlmProvider::new(provider),
            }
        }),
        ProviderKind::Anthropic => match &keys.anthropic {
            Some(key) => Some(BoxLlmProvider::new(AnthropicProvider::new(
                key.clone(),
                model.model_code,
                model.descriptor(),
            )?)),
            None => None,
        },
        ProviderKind::Ollama | ProviderKind::OpenAiCompatible => {
            return Err(LlmError::InvalidRequest(format!(
                "{} models are declared through settings, not the built-in catalog",
                model.kind
            )));
        }
    };
    Ok(provider)
}

fn register_hosted(mut builder: ModelRegistryBuilder, models: &[HostedModel], keys: &HostedKeys) -> ModelRegistryBuilder {
    for model in models {
        match create_hosted_provider(model, keys) {
            Ok(Some(provider)) => builder = builder.register(provider),
            Ok(None) => {
                tracing::debug!(model = model.id, provider = %model.kind, "no credential, skipping model");
            }
            Err(e) => {
                tracing::warn!(model = model.id, error = %e, "failed to create provider, skipping model");
            }
        }
    }
    builder
}

async fn ollama_family(settings: &ProviderSettings) -> Vec<BoxLlmProvider> {
    let Some(base_url) = non_empty(&settings.ollama_url) else {
        return Vec::new();
    };
    if settings.ollama_models.is_empty() {
        return Vec::new();
    }

    if let Err(e) = probe::probe_ollama(base_url).await {
        tracing::warn!(
            url = base_url,
            error = %e,
            "could not reach Ollama, registering its models anyway; check the configured URL"
        );
    }

    settings
        .ollama_models
        .iter()
        .filter_map(|spec| {
            OllamaProvider::new(base_url, spec.code.clone(), ollama_descriptor(spec))
                .map(BoxLlmProvider::new)
                .inspect_err(|e| tracing::warn!(model = %spec.code, error = %e, "failed to create Ollama provider"))
                .ok()
        })
        .collect()
}

async fn compatible_family(settings: &ProviderSettings) -> Vec<BoxLlmProvider> {
    let Some(base_url) = non_empty(&settings.openai_compatible_url) else {
        return Vec::new();
    };
    if settings.openai_compatible_models.is_empty() {
        return Vec::new();
    }

    let api_key = secret(&settings.openai_compatible_key);
    if let Err(e) = probe::probe_openai_compatible(base_url, api_key.as_ref()).await {
        tracing::warn!(
            url = base_url,
            error = %e,
            "could not reach OpenAI-compatible server, registering its models anyway"
        );
    }

    settings
        .openai_compatible_models
        .iter()
        .filter_map(|spec| {
            OpenAiCompatibleProvider::new(
                base_url,
                api_key.clone(),
                spec.code.clone(),
                compatible_descriptor(spec),
            )
            .map(BoxLlmProvider::new)
            .inspect_err(|e| tracing::warn!(model = %spec.code, error = %e, "failed to create OpenAI-compatible provider"))
            .ok()
        })
        .collect()
}

/// Build the process-wide model registry from provider settings.
///
/// Never fails: families without credentials are left out, unreachable
/// self-hosted backends are logged and registered anyway.
pub async fn build_registry(settings: &ProviderSettings) -> ModelRegistry {
    let keys = HostedKeys::from_settings(settings);

    let builder = register_hosted(ModelRegistry::builder(), PRIMARY_MODELS, &keys)
        .register_all(ollama_family(settings).await)
        .register_all(compatible_family(settings).await);
    let registry = register_hosted(builder, PREVIEW_MODELS, &keys).build();

    tracing::info!(models = registry.len(), "model registry ready");
    registry
}
