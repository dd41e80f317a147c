use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod console;
/// One handler per subcommand.
pub mod handlers;

/// cmdroute: route command lines through a declarative command registry.
///
/// Commands are read from TOML manifests and bound to an action that echoes
/// the validated arguments, which makes the binary handy for trying out a
/// manifest before wiring it into a host.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Manifest file, or directory of `*.toml` manifests. Repeatable.
    #[arg(short, long = "manifest", required = true)]
    pub manifests: Vec<PathBuf>,

    /// Permission granted to the caller. Repeatable; `*` grants everything.
    #[arg(short, long = "grant")]
    pub grants: Vec<String>,

    /// Name of an online entity (player). Repeatable.
    #[arg(long = "entity")]
    pub entities: Vec<String>,

    /// Name of a known but offline entity. Repeatable.
    #[arg(long = "offline")]
    pub offline: Vec<String>,

    /// Name the caller identifies as.
    #[arg(long, default_value = "console")]
    pub caller: String,

    /// What to do with the loaded commands.
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Subcommands of `cmdroute`.
#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Dispatches a command line, e.g. `run "serverinfo player Alice stats"`.
    Run {
        /// The full command line, base word first. A leading `/` is ignored.
        line: String,
    },
    /// Prints completion suggestions for a partial command line.
    ///
    /// A trailing space means the next token is being started.
    Complete { line: String },
    /// Lists every registered command.
    List {
        /// Print the declarations as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Prints the grouped command help.
    Help,
}
