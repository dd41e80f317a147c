use crate::core::{help, registry::CommandRegistry};
use anyhow::{Context, Result};
use colored::*;

/// Lists every registered command, as a table or as JSON.
pub fn handle(registry: &CommandRegistry, json: bool) -> Result<()> {
    let declarations = registry.declarations();

    if json {
        let rendered = serde_json::to_string_pretty(&declarations)
            .context("Failed to serialize command declarations")?;
        println!("{}", rendered);
        return Ok(());
    }

    if declarations.is_empty() {
        println!("{}", "No commands registered.".yellow());
        return Ok(());
    }

    let width = declarations.keys().map(String::len).max().unwrap_or(0);
    for (path, declaration) in &declarations {
        let permission = if declaration.requires_permission() {
            declaration.permission.as_str()
        } else {
            "-"
        };
        let padded = format!("{:<width$}", path, width = width);
        println!(
            "{}  {}  {}",
            padded.cyan(),
            declaration.usage_line(),
            permission.dimmed()
        );
    }
    Ok(())
}

/// Prints the grouped help listing.
pub fn handle_help(registry: &CommandRegistry) -> Result<()> {
    print!("{}", help::render_help(&registry.declarations()));
    Ok(())
}
