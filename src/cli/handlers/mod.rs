// src/cli/handlers/mod.rs

// One module per `cmdroute` subcommand.

/// `cmdroute complete <line>`.
pub mod complete;
/// `cmdroute list` and `cmdroute help`.
pub mod list;
/// `cmdroute run <line>`.
pub mod run;
