//! CLI entry point and dispatch logic
//!
//! `run()` parses arguments, discovers configuration, installs logging,
//! creates the tokio runtime, dispatches, and owns all error output.

use clap::Parser;
use std::ffi::OsString;
use tracing::debug;
use vmshell_utils::error::ConfigError;
use vmshell_utils::logging::init_tracing;

use super::args::{Cli, Commands, shell_tail};
use super::commands;
use crate::{CliArgs, Config, ExitCode, VmShellError};

/// Main CLI execution function.
///
/// Prints everything the user sees, including errors, and returns the exit
/// code for `main` to hand to the OS. Failures the router already explained
/// exit 1 with nothing further printed.
pub fn run() -> Result<(), ExitCode> {
    let raw: Vec<OsString> = std::env::args_os().collect();
    let cli = Cli::parse_from(&raw);

    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        verbose: Some(cli.verbose),
        instance: cli.instance.clone(),
        distribution: cli.distribution.clone(),
        supervisor: cli.supervisor.clone(),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            let reason = format!("{err:#}");
            let err = VmShellError::Config(match cli_args.config_path {
                Some(path) => ConfigError::InvalidFile { path, reason },
                None => ConfigError::DiscoveryFailed { reason },
            });
            return Err(report(&err));
        }
    };

    if let Err(e) = init_tracing(config.verbose()) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }
    debug!(config = ?config.effective_config(), "Effective configuration");

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => return Err(report(&VmShellError::Runtime(e))),
    };

    let result = rt.block_on(async {
        match cli.command {
            Commands::Shell { args } => {
                let args = shell_tail(&raw).unwrap_or(args);
                commands::execute_shell_command(&args, &config).await
            }
        }
    });

    match result {
        Ok(code) if code.is_success() => Ok(()),
        Ok(code) => Err(code),
        Err(err) => Err(report(&err)),
    }
}

/// Print `err` unless it was already reported, and map it to an exit code.
fn report(err: &VmShellError) -> ExitCode {
    if !err.is_already_reported() {
        eprint!("{}", err.display_for_user());
    }
    err.to_exit_code()
}
