//! `scribe models`: list the registry catalog.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use scribe_core::llm::budget::budget_for;
use scribe_core::llm::registry::ModelRegistry;
use scribe_types::llm::CapabilityDescriptor;

use super::budget::format_tokens;

/// Print every registered model, in registration order.
pub fn list_models(registry: &ModelRegistry, json: bool) -> Result<()> {
    let catalog = registry.catalog();

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    if catalog.is_empty() {
        println!();
        println!(
            "  {} No models available. Set {} or {}, or configure a local server.",
            style("i").blue().bold(),
            style("OPENAI_API_KEY").cyan(),
            style("ANTHROPIC_API_KEY").cyan()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", models_table(&catalog));
    println!();
    Ok(())
}

fn models_table(catalog: &[&CapabilityDescriptor]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Traits").fg(Color::White),
        Cell::new("Images").fg(Color::White),
        Cell::new("Context").fg(Color::White),
        Cell::new("Budget").fg(Color::White),
    ]);

    for descriptor in catalog {
        let images = if descriptor.accepts_images {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            Cell::new(&descriptor.id).fg(Color::Cyan),
            Cell::new(&descriptor.display_name),
            Cell::new(&descriptor.traits),
            images,
            Cell::new(format_tokens(descriptor.context_length)),
            Cell::new(format_tokens(budget_for(descriptor))),
        ]);
    }
    table
}
