//! Command implementations

use std::ffi::OsString;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::args::{build_cli, is_help_request};
use crate::shell::execute_shell;
use crate::{Config, ExitCode, HostPlatform, NativeRunner, RouterSettings, VmShellError};

/// Execute `vmshell shell [ARGS...]`.
pub(super) async fn execute_shell_command(
    args: &[OsString],
    config: &Config,
) -> Result<ExitCode, VmShellError> {
    if is_help_request(args) {
        print_shell_help();
        return Ok(ExitCode::SUCCESS);
    }

    let settings = RouterSettings::from_config(config, HostPlatform::current());
    debug!(settings = ?settings, "Resolved router settings");

    let cancel = CancellationToken::new();
    let probe_cancel = cancel.child_token();
    cancel_on_interrupt(probe_cancel.clone());

    execute_shell(
        &NativeRunner::new(),
        settings,
        args,
        &mut std::io::stderr(),
        &probe_cancel,
        &cancel,
    )
    .await
}

fn print_shell_help() {
    let mut cli = build_cli();
    cli.build();
    if let Some(shell) = cli.find_subcommand_mut("shell") {
        println!("{}", shell.render_long_help());
    }
}

/// Cancel `token` on the first Ctrl-C.
///
/// Installing the listener also keeps later interrupts from killing vmshell
/// while an attached child owns the terminal.
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                debug!("Interrupt received");
                token.cancel();
            }
            Err(e) => debug!(error = %e, "Failed to listen for interrupts"),
        }
    });
}
