use crate::{
    cli::console::{ConsoleCaller, split_line},
    core::registry::CommandRegistry,
};
use anyhow::Result;

/// Main entry point for the `complete` subcommand. Prints one suggestion per line.
pub fn handle(registry: &CommandRegistry, caller: &ConsoleCaller, line: &str) -> Result<()> {
    let (base, tokens) = split_line(line, true)?;
    let suggestions = registry.complete(caller, &base, &tokens);
    log::debug!("{} suggestion(s) for {:?}", suggestions.len(), line);
    for suggestion in suggestions {
        println!("{}", suggestion);
    }
    Ok(())
}
