//! Backend probing and the diagnostics a failed probe produces.

use tokio_util::sync::CancellationToken;
use tracing::debug;
use vmshell_runner::{ProcessRunner, RunnerError};
use vmshell_utils::paths::EnvOverride;

use crate::backend::Backend;
use crate::state::{InstanceState, ProbeFailure};

/// Run `backend`'s status helper and classify what it reports.
///
/// A helper that cannot be started is a [`ProbeFailure::Spawn`], not an
/// error: the router moves on to the next candidate.
///
/// # Errors
/// Only cancellation escapes, as [`RunnerError::Cancelled`].
pub async fn probe<R>(
    backend: &Backend,
    runner: &R,
    env: &[EnvOverride],
    cancel: &CancellationToken,
) -> Result<InstanceState, RunnerError>
where
    R: ProcessRunner + ?Sized,
{
    let cmd = backend.probe_command().envs(env.iter().cloned());
    debug!(backend = %backend, command = %cmd, "Probing backend");

    let state = match runner.run(&cmd, cancel).await {
        Ok(output) => {
            debug!(
                backend = %backend,
                exit_code = ?output.exit_code,
                stdout_len = output.stdout.len(),
                stderr_len = output.stderr.len(),
                "Probe finished"
            );
            backend.classify(&output)
        }
        Err(e) if e.is_cancelled() => return Err(e),
        Err(e) => InstanceState::ProbeFailed(ProbeFailure::Spawn {
            command: cmd.to_string(),
            reason: e.to_string(),
        }),
    };

    debug!(backend = %backend, state = %state, "Classified backend state");
    Ok(state)
}

/// The user-facing explanation for a non-running backend.
///
/// `restart_directive` is appended to state complaints as its own sentence.
/// Returns `None` for [`InstanceState::Running`].
#[must_use]
pub fn diagnostic(
    backend: &Backend,
    state: &InstanceState,
    restart_directive: &str,
) -> Option<String> {
    let message = match (backend, state) {
        (_, InstanceState::Running) => return None,

        (Backend::PosixSupervisor { .. }, InstanceState::OtherKnown(current)) => format!(
            "The VM needs to be in state \"Running\" in order to execute 'vmshell shell', \
             but it is currently in state \"{current}\".\n{restart_directive}."
        ),
        (Backend::PosixSupervisor { instance, .. }, InstanceState::NotListed) => format!(
            "The VM instance \"{instance}\" needs to be created.\n{restart_directive}."
        ),
        (Backend::PosixSupervisor { .. }, InstanceState::ProbeFailed(failure)) => {
            match failure {
                ProbeFailure::Exited { stderr, .. } if !stderr.trim().is_empty() => {
                    stderr.trim_end().to_string()
                }
                _ => format!(
                    "Underlying {} check failed with no output.",
                    backend.helper_name()
                ),
            }
        }

        (Backend::WindowsDistribution { distribution, .. }, InstanceState::OtherKnown(current)) => {
            format!(
                "The WSL distribution \"{distribution}\" needs to be in state \"Running\" in order \
                 to execute 'vmshell shell', but it is currently in state \"{current}\".\n\
                 {restart_directive}."
            )
        }
        (Backend::WindowsDistribution { distribution, .. }, InstanceState::NotListed) => format!(
            "The WSL distribution \"{distribution}\" needs to be running in order to execute \
             'vmshell shell', but it currently is not.\n{restart_directive}."
        ),
        (Backend::WindowsDistribution { .. }, InstanceState::ProbeFailed(failure)) => {
            match failure {
                ProbeFailure::Decode { error, .. } => {
                    format!("Failed to read the WSL distribution list: {error}")
                }
                ProbeFailure::Spawn { command, reason } => {
                    format!("Failed to run `{command}`: {reason}")
                }
                ProbeFailure::Exited {
                    command, stderr, ..
                } if !stderr.trim().is_empty() => {
                    format!("Failed to run `{command}`: {}", stderr.trim_end())
                }
                ProbeFailure::Exited { .. } => {
                    format!("Failed to check WSL distributions: {failure}")
                }
            }
        }
    };

    Some(message)
}
