//! Span constructors used around provider calls and retrieval runs.
//!
//! Field names match the constants in [`crate::genai_attrs`]; `otel.name`
//! renames the exported span to `"chat <model>"`.

use tracing::Span;

use crate::genai_attrs::{OP_CHAT, OP_RETRIEVE};

/// Span wrapping one model call.
pub fn chat_span(provider: &str, model: &str, temperature: f64, stream: bool) -> Span {
    tracing::info_span!(
        "chat",
        otel.name = %format!("{OP_CHAT} {model}"),
        gen_ai.operation.name = OP_CHAT,
        gen_ai.provider.name = provider,
        gen_ai.request.model = model,
        gen_ai.request.temperature = temperature,
        gen_ai.request.stream = stream,
    )
}

/// Span wrapping one chunk assembly run.
pub fn retrieve_span(model: &str, candidates: usize, safe_budget: u32) -> Span {
    tracing::info_span!(
        "retrieve",
        otel.name = %format!("{OP_RETRIEVE} {model}"),
        gen_ai.operation.name = OP_RETRIEVE,
        gen_ai.request.model = model,
        candidates,
        safe_budget,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genai_attrs::*;

    #[test]
    fn test_chat_span_carries_genai_fields() {
        tracing::subscriber::with_default(tracing_subscriber::registry(), || {
            let span = chat_span("anthropic", "claude-3-opus-latest", 0.7, true);
            for field in [
                GEN_AI_OPERATION_NAME,
                GEN_AI_PROVIDER_NAME,
                GEN_AI_REQUEST_MODEL,
                GEN_AI_REQUEST_TEMPERATURE,
                GEN_AI_REQUEST_STREAM,
            ] {
                assert!(span.has_field(field), "missing {field}");
            }
            assert_eq!(span.metadata().map(|m| m.name()), Some("chat"));
        });
    }

    #[test]
    fn test_retrieve_span_fields() {
        tracing::subscriber::with_default(tracing_subscriber::registry(), || {
            let span = retrieve_span("gpt-4o", 5, 71_500);
            assert!(span.has_field(GEN_AI_OPERATION_NAME));
            assert!(span.has_field("safe_budget"));
        });
    }
}
