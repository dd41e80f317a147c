// src/cli/console.rs

//! The terminal host: a caller backed by command-line grants, an entity
//! directory seeded from flags, and line tokenization.

use crate::cli::Cli;
use crate::core::handler::{Action, Arguments, action};
use crate::core::host::{Caller, InMemoryDirectory};
use crate::core::manifest::{self, Manifest};
use crate::core::registry::CommandRegistry;
use crate::core::validator_registry::ValidatorRegistry;
use crate::models::{CommandDefinition, EntityRef};
use anyhow::{Context, Result, anyhow};
use colored::*;
use std::collections::HashSet;
use std::sync::Arc;

/// Grants every permission when present in the grant list.
const WILDCARD_GRANT: &str = "*";

/// The person at the terminal.
#[derive(Debug)]
pub struct ConsoleCaller {
    name: String,
    grants: HashSet<String>,
}

impl ConsoleCaller {
    /// `grants` may contain `*` to grant every permission.
    pub fn new(name: impl Into<String>, grants: impl IntoIterator<Item = String>) -> Self {
        Self {
            name: name.into(),
            grants: grants.into_iter().collect(),
        }
    }
}

impl Caller for ConsoleCaller {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.grants.contains(WILDCARD_GRANT) || self.grants.contains(permission)
    }

    fn send_message(&self, message: &str) {
        println!("{}", message.yellow());
    }
}

/// Loads all manifests named on the command line and registers their
/// commands against a directory built from the entity flags.
pub fn build_registry(cli: &Cli) -> Result<CommandRegistry> {
    let directory = InMemoryDirectory::with_entities(
        cli.entities
            .iter()
            .map(EntityRef::online)
            .chain(cli.offline.iter().map(EntityRef::offline)),
    );
    let mut registry = CommandRegistry::new(ValidatorRegistry::with_builtins(Arc::new(directory)));

    let mut combined = Manifest::default();
    for path in &cli.manifests {
        let loaded = manifest::load_manifests(path)
            .with_context(|| format!("Failed to load manifest '{}'", path.display()))?;
        combined.merge(loaded);
    }
    let count = combined
        .register_all(&mut registry, echo_action)
        .context("Failed to register commands")?;
    log::debug!("Registered {} command(s)", count);
    Ok(registry)
}

/// Binds a manifest command to an action that prints what it received.
fn echo_action(definition: &CommandDefinition) -> Action {
    let path = definition.full_path();
    action(move |caller, args| {
        println!(
            "{} {} {}",
            "invoked".green().bold(),
            path.cyan(),
            format!("(by {})", caller.name()).dimmed()
        );
        print_arguments(args);
        Ok(())
    })
}

fn print_arguments(args: &Arguments) {
    for (name, value) in args.named() {
        match value {
            Some(value) => println!("  {} = {}", name, value),
            None => println!("  {} {}", name, "(absent)".dimmed()),
        }
    }
}

/// Splits a raw line into the base word and the remaining tokens.
///
/// When `open_token` is set and the line ends in whitespace, an empty token is
/// appended so completion knows a new token has been started.
pub fn split_line(line: &str, open_token: bool) -> Result<(String, Vec<String>)> {
    let trimmed = line.trim_start();
    let trimmed = trimmed.strip_prefix('/').unwrap_or(trimmed);
    let mut tokens =
        shlex::split(trimmed).ok_or_else(|| anyhow!("Unbalanced quotes in '{}'", line))?;
    if open_token && trimmed.ends_with(char::is_whitespace) {
        tokens.push(String::new());
    }
    if tokens.is_empty() {
        return Err(anyhow!("No command given."));
    }
    let base = tokens.remove(0);
    Ok((base, tokens))
}
