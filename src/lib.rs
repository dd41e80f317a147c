//! A command registry and router.
//!
//! Commands are declared with a dotted path (`serverinfo.player.inventory`),
//! a permission and a list of typed arguments. The [`core::registry`] resolves
//! an incoming line to the deepest registered command, the
//! [`core::handler`] pipeline checks permission, arity and every argument
//! through a [`core::validators::Validator`] before running the bound action,
//! and the same machinery drives tab completion.

/// The `cmdroute` demo binary: arguments, console host and subcommands.
pub mod cli;
/// Shared constants.
pub mod constants;
/// The registry, router, validators and the handler pipeline.
pub mod core;
/// Declarations, definitions and validated values.
pub mod models;
