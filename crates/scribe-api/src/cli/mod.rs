//! CLI command definitions for the `scribe` binary.
//!
//! Uses clap derive macros for argument parsing. Every command accepts the
//! global `--json` flag for machine-readable output.

pub mod ask;
pub mod budget;
pub mod models;
pub mod retrieve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scribe_observe::tracing_setup::LogSettings;

/// Query hosted and local language models, and assemble web context for them.
#[derive(Parser)]
#[command(name = "scribe", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the configuration file.
    #[arg(long, global = true, env = "SCRIBE_CONFIG", default_value = "config.toml")]
    pub config: PathBuf,

    /// Write log lines to stderr as JSON.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter directive for the requested verbosity.
    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,scribe=debug",
            _ => "trace",
        }
    }

    pub fn log_settings(&self) -> LogSettings {
        LogSettings {
            json: self.log_json,
            otel: self.otel,
            ..LogSettings::new(self.log_directive())
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the models available with the current configuration.
    #[command(alias = "ls")]
    Models,

    /// Show a model's context length and safe retrieval budget.
    Budget {
        /// Model id (e.g. gpt-4o, claude-3-5-sonnet, llama3).
        model: String,
    },

    /// Send a prompt to a model.
    Ask {
        /// Model id.
        model: String,

        /// Prompt text.
        text: String,

        /// System prompt.
        #[arg(long)]
        system: Option<String>,

        /// Attach an image file (repeatable).
        #[arg(long = "image", value_name = "PATH")]
        images: Vec<PathBuf>,

        /// Sampling temperature in [0, 1].
        #[arg(long)]
        temperature: Option<f64>,

        /// Ask the model for a JSON object.
        #[arg(long)]
        json_mode: bool,

        /// Print the response incrementally as it arrives.
        #[arg(long)]
        stream: bool,
    },

    /// Fetch pages and assemble context chunks sized for a model.
    Retrieve {
        /// Model id whose context window sizes the budget.
        model: String,

        /// Page or PDF URLs, in rank order.
        #[arg(required = true)]
        urls: Vec<String>,

        /// Maximum number of sources to keep.
        #[arg(long)]
        max_results: Option<usize>,
    },
}
