//! Infrastructure layer for Scribe.
//!
//! Contains the implementations of the ports defined in `scribe-core`:
//! provider adapters and registry bootstrap (`llm`), the HTTP scraper, PDF
//! splitter and tokenizer used for retrieval (`retrieval`), and configuration
//! loading (`config`).

pub mod config;
pub mod llm;
pub mod retrieval;
