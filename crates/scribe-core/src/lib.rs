//! Provider-agnostic logic for Scribe.
//!
//! This crate defines the "ports" the infrastructure layer implements: the
//! [`llm::provider::LlmProvider`] contract every backend adapter satisfies and
//! the collaborator traits the retrieval assembler consumes. It depends only
//! on `scribe-types` -- never on `scribe-infra` or any HTTP crate.

pub mod llm;
pub mod retrieval;
