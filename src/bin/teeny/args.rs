use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The Teeny scripting language.
#[derive(Debug, Parser)]
#[command(name = "teeny", version, about = "The Teeny scripting language")]
pub struct Args {
    /// Script file to run; omit to start the interactive REPL.
    pub script: Option<PathBuf>,

    /// Arguments handed to the script as `argv`.
    pub script_args: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Copy a package directory into the global package path.
    Install {
        /// The directory to install; defaults to the current one.
        dir: Option<PathBuf>,
    },
}
