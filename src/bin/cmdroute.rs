// src/bin/cmdroute.rs

use anyhow::Result;
use clap::Parser;
use cmdroute::cli::{
    Cli, CliCommand,
    console::{self, ConsoleCaller},
    handlers,
};
use colored::*;

/// Sets up logging, parses arguments, builds the registry from the manifests
/// and dispatches to the subcommand handler. All errors end up here.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let registry = console::build_registry(&cli)?;
    let caller = ConsoleCaller::new(cli.caller.clone(), cli.grants.iter().cloned());

    match &cli.command {
        CliCommand::Run { line } => handlers::run::handle(&registry, &caller, line),
        CliCommand::Complete { line } => handlers::complete::handle(&registry, &caller, line),
        CliCommand::List { json } => handlers::list::handle(&registry, *json),
        CliCommand::Help => handlers::list::handle_help(&registry),
    }
}
