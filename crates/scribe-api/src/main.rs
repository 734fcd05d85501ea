//! Scribe CLI entry point.
//!
//! Binary name: `scribe`
//!
//! Parses CLI arguments, loads configuration and builds the model registry,
//! then dispatches to the command handler.

mod cli;

use clap::Parser;

use cli::{Cli, Commands};
use scribe_infra::config::load_config_with_env;
use scribe_infra::llm::build_registry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before parsing so `.env` can set SCRIBE_CONFIG
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    scribe_observe::tracing_setup::init_tracing(&cli.log_settings())
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    scribe_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config_with_env(&cli.config).await;
    let registry = build_registry(&config.providers).await;

    match cli.command {
        Commands::Models => cli::models::list_models(&registry, cli.json)?,

        Commands::Budget { model } => cli::budget::show_budget(&registry, &model, cli.json)?,

        Commands::Ask {
            model,
            text,
            system,
            images,
            temperature,
            json_mode,
            stream,
        } => {
            let args = cli::ask::AskArgs {
                model,
                text,
                system,
                images,
                temperature,
                json_mode,
                stream,
            };
            cli::ask::ask(&registry, args, cli.json).await?;
        }

        Commands::Retrieve {
            model,
            urls,
            max_results,
        } => {
            cli::retrieve::retrieve(&registry, &model, &urls, config.retrieval, max_results).await?;
        }
    }

    Ok(())
}
