use crate::error::RunnerError;
use async_trait::async_trait;
use std::process::Stdio;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{CommandSpec, ProcessOutput, ProcessRunner};

// ============================================================================
// NativeRunner - Host Process Execution
// ============================================================================

/// Host process runner built on `tokio::process::Command`.
///
/// `NativeRunner` is the production [`ProcessRunner`]. Captured runs are used
/// for status probes; attached runs hand the terminal to the VM shell.
///
/// # Cancellation
///
/// Every spawned child is marked `kill_on_drop`, so abandoning a wait because
/// the token fired also terminates the child instead of leaking it.
///
/// # Example
///
/// ```rust,no_run
/// use vmshell_runner::{CommandSpec, NativeRunner, ProcessRunner};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let runner = NativeRunner::new();
/// let cancel = CancellationToken::new();
/// let cmd = CommandSpec::new("limactl").args(["ls", "default", "--format", "{{.Status}}"]);
///
/// let output = runner.run(&cmd, &cancel).await.unwrap();
/// println!("{}", output.stdout_string());
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRunner;

impl NativeRunner {
    /// Create a new `NativeRunner`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn program_name(cmd: &CommandSpec) -> String {
    cmd.program.to_string_lossy().into_owned()
}

#[async_trait]
impl ProcessRunner for NativeRunner {
    async fn run(
        &self,
        cmd: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<ProcessOutput, RunnerError> {
        let mut command = cmd.to_tokio_command();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(command = %cmd, "Running helper");
        let child = command.spawn().map_err(|e| RunnerError::SpawnFailed {
            program: program_name(cmd),
            reason: e.to_string(),
        })?;

        tokio::select! {
            output = child.wait_with_output() => {
                let output = output.map_err(|e| RunnerError::WaitFailed {
                    program: program_name(cmd),
                    reason: e.to_string(),
                })?;
                debug!(command = %cmd, exit_code = ?output.status.code(), "Helper finished");
                Ok(ProcessOutput::new(output.stdout, output.stderr, output.status.code()))
            }
            () = cancel.cancelled() => {
                // Dropping the wait future drops the child, which kills it.
                Err(RunnerError::Cancelled { program: program_name(cmd) })
            }
        }
    }

    async fn run_attached(
        &self,
        cmd: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<Option<i32>, RunnerError> {
        let mut command = cmd.to_tokio_command();
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        debug!(command = %cmd, "Launching attached command");
        let mut child = command.spawn().map_err(|e| RunnerError::SpawnFailed {
            program: program_name(cmd),
            reason: e.to_string(),
        })?;

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| RunnerError::WaitFailed {
                    program: program_name(cmd),
                    reason: e.to_string(),
                })?;
                Ok(status.code())
            }
            () = cancel.cancelled() => {
                if let Err(e) = child.kill().await {
                    debug!(command = %cmd, error = %e, "Failed to kill cancelled child");
                }
                Err(RunnerError::Cancelled { program: program_name(cmd) })
            }
        }
    }
}
