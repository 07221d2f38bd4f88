//! Backend descriptions and the helper invocations they imply.

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use vmshell_runner::{CommandSpec, ProcessOutput};

use crate::decode::{DecodeError, OutputEncoding, decode_output};
use crate::state::{InstanceState, ProbeFailure, parse_distribution_table, parse_single_status};

/// Host helper that lists and enters WSL distributions.
pub const WSL_EXECUTABLE: &str = "wsl";

/// A candidate destination for the user's command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// A named instance managed by `limactl` on macOS or Linux.
    PosixSupervisor { executable: PathBuf, instance: String },
    /// A WSL distribution entered through an in-guest bridge executable.
    WindowsDistribution { distribution: String, bridge: String },
}

impl Backend {
    /// The status query for this backend.
    #[must_use]
    pub fn probe_command(&self) -> CommandSpec {
        match self {
            Self::PosixSupervisor {
                executable,
                instance,
            } => CommandSpec::new(executable)
                .args(["ls", instance.as_str(), "--format", "{{.Status}}"]),
            Self::WindowsDistribution { .. } => {
                CommandSpec::new(WSL_EXECUTABLE).args(["--list", "--verbose"])
            }
        }
    }

    /// The command that runs `args` inside this backend.
    ///
    /// `args` is appended untouched: no quoting, no splitting, no shell.
    #[must_use]
    pub fn launch_command(&self, args: &[OsString]) -> CommandSpec {
        match self {
            Self::PosixSupervisor {
                executable,
                instance,
            } => CommandSpec::new(executable)
                .args(["shell", instance.as_str()])
                .args(args),
            Self::WindowsDistribution {
                distribution,
                bridge,
            } => CommandSpec::new(WSL_EXECUTABLE)
                .args(["--distribution", distribution.as_str(), "--exec", bridge.as_str()])
                .args(args),
        }
    }

    #[must_use]
    pub const fn output_encoding(&self) -> OutputEncoding {
        match self {
            Self::PosixSupervisor { .. } => OutputEncoding::Native,
            Self::WindowsDistribution { .. } => OutputEncoding::Utf16Le,
        }
    }

    /// Display name of the helper program, used in fallback diagnostics.
    #[must_use]
    pub fn helper_name(&self) -> String {
        match self {
            Self::PosixSupervisor { executable, .. } => executable
                .file_name()
                .unwrap_or(executable.as_os_str())
                .to_string_lossy()
                .into_owned(),
            Self::WindowsDistribution { .. } => WSL_EXECUTABLE.to_string(),
        }
    }

    /// Classify a completed status query.
    ///
    /// The supervisor is judged on its stdout, `wsl` on its combined output;
    /// either is decoded with [`Backend::output_encoding`] first.
    #[must_use]
    pub fn classify(&self, output: &ProcessOutput) -> InstanceState {
        let command = self.probe_command().to_string();
        match self {
            Self::PosixSupervisor { instance, .. } => {
                match decode_output(&output.stdout, self.output_encoding()) {
                    Ok(stdout) => classify_supervisor(&stdout, output, instance, command),
                    Err(error) => {
                        InstanceState::ProbeFailed(ProbeFailure::Decode { command, error })
                    }
                }
            }
            Self::WindowsDistribution { distribution, .. } => {
                let raw = output.combined();
                let text = decode_output(&raw, self.output_encoding());
                classify_distribution(text, &raw, output, distribution, command)
            }
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PosixSupervisor { instance, .. } => {
                write!(f, "{} instance {instance}", self.helper_name())
            }
            Self::WindowsDistribution { distribution, .. } => {
                write!(f, "WSL distribution {distribution}")
            }
        }
    }
}

/// Stderr line `limactl` prints when the instance does not exist.
fn missing_instance_marker(instance: &str) -> String {
    format!("No instance matching {instance} found.")
}

// Stdout wins whenever it says anything; otherwise stderr decides between
// "not listed" and a failed probe.
fn classify_supervisor(
    stdout: &str,
    output: &ProcessOutput,
    instance: &str,
    command: String,
) -> InstanceState {
    let state = parse_single_status(stdout);
    if state != InstanceState::NotListed {
        return state;
    }

    let stderr = output.stderr_string();
    if stderr.contains(&missing_instance_marker(instance)) {
        return InstanceState::NotListed;
    }
    if !output.success() || !stderr.trim().is_empty() {
        return InstanceState::ProbeFailed(ProbeFailure::Exited {
            command,
            exit_code: output.exit_code,
            stderr,
        });
    }

    InstanceState::NotListed
}

fn classify_distribution(
    text: Result<String, DecodeError>,
    raw: &[u8],
    output: &ProcessOutput,
    distribution: &str,
    command: String,
) -> InstanceState {
    if !output.success() {
        return InstanceState::ProbeFailed(ProbeFailure::Exited {
            command,
            exit_code: output.exit_code,
            stderr: text.unwrap_or_else(|_| String::from_utf8_lossy(raw).into_owned()),
        });
    }

    match text {
        Ok(text) => parse_distribution_table(&text, distribution),
        Err(error) => InstanceState::ProbeFailed(ProbeFailure::Decode { command, error }),
    }
}
