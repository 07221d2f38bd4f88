use crate::error::RunnerError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::CommandSpec;

// ============================================================================
// ProcessRunner Trait - Process Execution Interface
// ============================================================================

/// Output from a captured process execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output from the process
    pub stdout: Vec<u8>,
    /// Standard error from the process
    pub stderr: Vec<u8>,
    /// Exit code from the process (None if terminated by signal)
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    /// Create a new `ProcessOutput` with the given values.
    #[must_use]
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: Option<i32>) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
        }
    }

    /// Get stdout as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Stdout followed by stderr, the way a combined-output capture reads.
    #[must_use]
    pub fn combined(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.stdout.len() + self.stderr.len());
        bytes.extend_from_slice(&self.stdout);
        bytes.extend_from_slice(&self.stderr);
        bytes
    }

    /// Check if the process exited successfully (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Trait for process execution.
///
/// Implementations MUST use argv-style APIs only (no shell string evaluation)
/// and MUST stop waiting promptly once `cancel` fires, returning
/// [`RunnerError::Cancelled`].
///
/// The trait is the seam the router is tested through: scripted
/// implementations stand in for `limactl` and `wsl` on any host.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Run a command to completion with stdout and stderr captured.
    ///
    /// # Returns
    ///
    /// * `Ok(ProcessOutput)` - The process completed (possibly with non-zero exit code)
    /// * `Err(RunnerError::SpawnFailed)` - The process could not be started
    /// * `Err(RunnerError::Cancelled)` - `cancel` fired before the process finished
    async fn run(
        &self,
        cmd: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<ProcessOutput, RunnerError>;

    /// Run a command with the caller's stdin, stdout and stderr attached.
    ///
    /// Returns the child's exit code verbatim, or `None` when the child was
    /// terminated by a signal.
    async fn run_attached(
        &self,
        cmd: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<Option<i32>, RunnerError>;
}
