//! LLM provider abstractions for Scribe.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider adapters
//! - `BoxLlmProvider`: object-safe wrapper for dynamic dispatch
//! - `ModelRegistry`: immutable id -> adapter catalog built at startup
//! - `budget`: safe retrieval budget from a model's context length

pub mod box_provider;
pub mod budget;
pub mod json_seed;
pub mod provider;
pub mod registry;
pub mod turns;
