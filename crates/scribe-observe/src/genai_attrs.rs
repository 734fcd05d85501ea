//! OpenTelemetry GenAI Semantic Convention attribute constants.
//!
//! Provider adapters open one span per call named `"{operation} {model}"`
//! (e.g. `"chat gpt-4o"`) and record these attributes on it.

/// The name of the operation being performed (e.g., "chat").
pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";

/// The name of the GenAI provider (e.g., "anthropic", "ollama").
pub const GEN_AI_PROVIDER_NAME: &str = "gen_ai.provider.name";

/// The backend model code requested (e.g., "claude-3-5-sonnet-20240620").
pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";

/// The sampling temperature for the request.
pub const GEN_AI_REQUEST_TEMPERATURE: &str = "gen_ai.request.temperature";

/// Whether the response was requested as a stream.
pub const GEN_AI_REQUEST_STREAM: &str = "gen_ai.request.stream";

// --- Operation name values ---

/// Standard chat completion operation.
pub const OP_CHAT: &str = "chat";

/// Retrieval context assembly.
pub const OP_RETRIEVE: &str = "retrieve";
