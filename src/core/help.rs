// src/core/help.rs

use crate::models::CommandDeclaration;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Renders every declaration grouped under its base word, groups sorted by
/// name and commands by path.
pub fn render_help(declarations: &BTreeMap<String, CommandDeclaration>) -> String {
    let mut groups: BTreeMap<&str, Vec<&CommandDeclaration>> = BTreeMap::new();
    for declaration in declarations.values() {
        groups
            .entry(declaration.base_word())
            .or_default()
            .push(declaration);
    }

    let mut out = String::from("=== Commands ===\n");
    for (base, commands) in groups {
        let _ = write!(out, "\n/{}:\n", base);
        for declaration in commands {
            let _ = writeln!(out, "  {}", declaration.usage_line());
            if !declaration.description.is_empty() {
                let _ = writeln!(out, "    -> {}", declaration.description);
            }
            if declaration.requires_permission() {
                let _ = writeln!(out, "    permission: {}", declaration.permission);
            }
        }
    }
    out
}

/// Usage of a single command followed by one line per argument.
pub fn render_command_help(declaration: &CommandDeclaration) -> String {
    let mut out = format!("Usage: {}\n", declaration.usage_line());
    for argument in &declaration.arguments {
        let _ = write!(out, "  {:<16} {}", argument.placeholder(), argument.kind);
        if !argument.description.is_empty() {
            let _ = write!(out, " - {}", argument.description);
        }
        out.push('\n');
    }
    out
}
