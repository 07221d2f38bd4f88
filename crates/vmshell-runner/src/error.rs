//! Error types for runner module

use thiserror::Error;

/// Process execution errors.
///
/// A child that starts and exits nonzero is NOT an error here; it is reported
/// through [`ProcessOutput`](crate::ProcessOutput) or the attached exit code.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to start '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Failed to wait for '{program}': {reason}")]
    WaitFailed { program: String, reason: String },

    #[error("Cancelled while waiting for '{program}'")]
    Cancelled { program: String },
}

impl RunnerError {
    /// True when the error came from the cancellation context rather than
    /// from the child process itself.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
