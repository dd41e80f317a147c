use crate::{
    cli::console::{ConsoleCaller, split_line},
    core::{
        handler::Rejection,
        help,
        registry::{CommandRegistry, DispatchOutcome},
    },
};
use anyhow::{Result, anyhow};
use colored::*;

/// Main entry point for the `run` subcommand.
///
/// The rejection reason itself has already been sent to the caller by the
/// registry; this only adds the usage hint and turns the outcome into an exit
/// status.
pub fn handle(registry: &CommandRegistry, caller: &ConsoleCaller, line: &str) -> Result<()> {
    let (base, tokens) = split_line(line, false)?;

    match registry.dispatch(caller, &base, &tokens) {
        DispatchOutcome::Invoked => Ok(()),
        DispatchOutcome::Rejected(rejection) => {
            let wants_usage = matches!(
                rejection,
                Rejection::TooFewArguments { .. }
                    | Rejection::MissingArgument { .. }
                    | Rejection::InvalidArgument { .. }
            );
            if wants_usage && let Some((handler, _)) = registry.resolve(&base, &tokens) {
                print!("{}", help::render_command_help(handler.declaration()).dimmed());
            }
            Err(anyhow!("Command was rejected."))
        }
        DispatchOutcome::Unresolved => {
            print!("{}", help::render_help(&registry.declarations()));
            Err(anyhow!("Unknown command: '{}'", base.cyan()))
        }
    }
}
