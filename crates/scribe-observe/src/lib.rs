//! Observability helpers for Scribe: subscriber setup and the span attribute
//! names shared by every provider adapter.

pub mod genai_attrs;
pub mod spans;
pub mod tracing_setup;
