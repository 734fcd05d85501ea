//! Shared domain types for Scribe.
//!
//! This crate contains the types exchanged between the invocation layer, the
//! retrieval assembler and their callers: model descriptors, invocation
//! requests, image payloads, retrieval sources, chunks and configuration.
//!
//! Zero infrastructure dependencies -- only serde, thiserror and base64.

pub mod config;
pub mod image;
pub mod llm;
pub mod retrieval;
