//! Command-line interface for vmshell
//!
//! - `args`: clap definitions
//! - `run`: entry point, config discovery, runtime and error output
//! - `commands`: command implementations

pub mod args;
mod commands;
mod run;


pub use args::{Cli, Commands, build_cli};
pub use run::run;
