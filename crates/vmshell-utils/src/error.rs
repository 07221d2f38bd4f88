//! Error types for vmshell
//!
//! Library code returns these values and never calls `std::process::exit()`.
//! The CLI turns a [`VmShellError`] into one printed message (or none, for
//! failures that were already reported) and an [`ExitCode`].

use std::path::PathBuf;
use thiserror::Error;
use vmshell_runner::RunnerError;

use crate::exit_codes::ExitCode;

/// Configuration could not be discovered or loaded.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

/// A prerequisite environment step failed before any probe ran.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvSetupError {
    #[error("Could not determine the application home directory")]
    AppHomeUnavailable,

    #[error("Can't find the supervisor home directory at {}", path.display())]
    SupervisorHomeMissing { path: PathBuf },

    #[error("Path {} exists but isn't a directory", path.display())]
    SupervisorHomeNotDirectory { path: PathBuf },

    #[error("Failed to add {} to the search path: {reason}", dir.display())]
    SearchPathJoin { dir: PathBuf, reason: String },
}

/// Top-level error for a vmshell invocation.
#[derive(Error, Debug)]
pub enum VmShellError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Environment setup failed: {0}")]
    EnvSetup(#[from] EnvSetupError),

    #[error("Failed to launch the VM command: {0}")]
    Spawn(RunnerError),

    #[error("Interrupted")]
    Cancelled,

    /// Routing failed and the prober already told the user why.
    #[error("No running VM was found")]
    AlreadyReported,

    #[error("Failed to create async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl From<RunnerError> for VmShellError {
    fn from(err: RunnerError) -> Self {
        if err.is_cancelled() {
            Self::Cancelled
        } else {
            Self::Spawn(err)
        }
    }
}

impl VmShellError {
    /// Whether a message for this error has already reached the user.
    ///
    /// The top-level handler prints nothing for these, only exits.
    #[must_use]
    pub const fn is_already_reported(&self) -> bool {
        matches!(self, Self::AlreadyReported)
    }

    /// Map this error to the process exit code.
    #[must_use]
    pub const fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Cancelled => ExitCode::CANCELLED,
            Self::EnvSetup(_) | Self::Spawn(_) | Self::AlreadyReported | Self::Runtime(_) => {
                ExitCode::INTERNAL
            }
        }
    }

    /// Suggested actions to resolve the error.
    #[must_use]
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(_) => vec![
                "Check the TOML syntax of .vmshell/config.toml".to_string(),
                "Pass --config to point at a specific file".to_string(),
            ],
            Self::EnvSetup(EnvSetupError::SupervisorHomeMissing { .. }) => vec![
                "Start the VM once from its management application so its home directory is created"
                    .to_string(),
                "Set [supervisor] home in .vmshell/config.toml if it lives elsewhere".to_string(),
            ],
            Self::EnvSetup(_) => vec!["Check [app] home in .vmshell/config.toml".to_string()],
            Self::Spawn(_) => vec![
                "Make sure the VM helper executable is installed and on PATH".to_string(),
            ],
            Self::Cancelled | Self::AlreadyReported | Self::Runtime(_) => Vec::new(),
        }
    }

    /// A user-facing message with actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {self}\n");

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }
}
