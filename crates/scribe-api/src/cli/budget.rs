//! `scribe budget`: context length and safe retrieval budget for one model.

use anyhow::Result;
use console::style;

use scribe_core::llm::registry::ModelRegistry;

/// Format a token count with thousands separators: `128000` becomes `128,000`.
pub fn format_tokens(tokens: u32) -> String {
    let digits = tokens.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn show_budget(registry: &ModelRegistry, model: &str, json: bool) -> Result<()> {
    let descriptor = registry.descriptor(model)?;
    let safe_budget = registry.safe_budget(model)?;

    if json {
        let budget = serde_json::json!({
            "model": descriptor.id,
            "context_length": descriptor.context_length,
            "safe_budget": safe_budget,
        });
        println!("{}", serde_json::to_string_pretty(&budget)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style(&descriptor.display_name).bold(),
        style(format!("({})", descriptor.id)).dim()
    );
    println!("  Context window: {} tokens", style(format_tokens(descriptor.context_length)).cyan());
    println!("  Safe budget:    {} tokens", style(format_tokens(safe_budget)).green());
    println!();
    Ok(())
}
