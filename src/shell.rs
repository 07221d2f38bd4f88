//! Route selection followed by the attached launch.

use std::ffi::OsString;
use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use vmshell_router::{Router, RouterSettings};
use vmshell_runner::ProcessRunner;
use vmshell_utils::error::VmShellError;
use vmshell_utils::exit_codes::ExitCode;

/// Probe for a running backend and run `args` inside it with the caller's
/// terminal attached.
///
/// `probe_cancel` only governs probing; once a route is chosen the child is
/// bound to `cancel`, so an interrupt aimed at the interactive session
/// reaches the child instead of tearing it down.
///
/// Returns the child's exit code verbatim (1 if it was killed by a signal).
///
/// # Errors
/// Environment setup, cancellation, launch failure, or
/// [`VmShellError::AlreadyReported`] once `diagnostics` has explained why no
/// backend is usable.
pub async fn execute_shell<R, W>(
    runner: &R,
    settings: RouterSettings,
    args: &[OsString],
    diagnostics: &mut W,
    probe_cancel: &CancellationToken,
    cancel: &CancellationToken,
) -> Result<ExitCode, VmShellError>
where
    R: ProcessRunner + ?Sized,
    W: Write,
{
    let decision = Router::new(runner, settings)
        .select(args, diagnostics, probe_cancel)
        .await?;

    debug!(command = %decision.command, "Launching command in VM");
    let status = runner.run_attached(&decision.command, cancel).await?;
    debug!(status = ?status, "VM command finished");

    Ok(ExitCode::from_child(status))
}
