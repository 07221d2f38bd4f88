//! End-to-end routing scenarios against a scripted runner.
//!
//! Each test plays back helper output for one host situation and checks the
//! probes issued, the diagnostics written, and the command finally attached.

mod common;

use common::{RESTART_DIRECTIVE, ScriptedRunner, args, settings, utf16le, wsl_table};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use vmshell::shell::execute_shell;
use vmshell::{ExitCode, HostPlatform, RunnerError, VmShellError};

/// App home with an existing `lima` directory.
fn app_home() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("lima")).unwrap();
    dir
}

/// A file standing in for an installed `limactl`.
fn installed_supervisor(dir: &Path) -> PathBuf {
    let exe = dir.join("limactl.exe");
    std::fs::write(&exe, b"").unwrap();
    exe
}

async fn route(
    runner: &ScriptedRunner,
    settings: vmshell::RouterSettings,
    user_args: &[OsString],
) -> (Result<ExitCode, VmShellError>, String) {
    let mut diagnostics = Vec::new();
    let cancel = CancellationToken::new();
    let result = execute_shell(
        runner,
        settings,
        user_args,
        &mut diagnostics,
        &cancel.child_token(),
        &cancel,
    )
    .await;
    (result, String::from_utf8(diagnostics).unwrap())
}

// ============================================================================
// POSIX supervisor
// ============================================================================

#[tokio::test]
async fn running_instance_receives_command_verbatim() {
    let home = app_home();
    let runner = ScriptedRunner::new()
        .probe_output(b"Running\n", b"", 0)
        .attached_result(Ok(Some(3)));
    let settings = settings(
        HostPlatform::Unix,
        PathBuf::from("limactl"),
        Some(home.path().to_path_buf()),
    );

    let (result, diagnostics) = route(&runner, settings, &args(&["ls", "-CF", "/tmp"])).await;

    assert_eq!(result.unwrap(), ExitCode::from_i32(3));
    assert!(diagnostics.is_empty());
    assert_eq!(
        runner.probed_commands(),
        vec!["limactl ls 0 --format {{.Status}}"]
    );

    let attached = runner.attached_commands();
    assert_eq!(attached.len(), 1);
    assert_eq!(attached[0].program, OsString::from("limactl"));
    assert_eq!(attached[0].args, args(&["shell", "0", "ls", "-CF", "/tmp"]));
    assert_eq!(
        attached[0].env_value("LIMA_HOME").map(PathBuf::from),
        Some(home.path().join("lima"))
    );
}

#[tokio::test]
async fn stopped_instance_is_reported_without_launch() {
    let home = app_home();
    let runner = ScriptedRunner::new().probe_output(b"Stopped\n", b"", 0);
    let settings = settings(
        HostPlatform::Unix,
        PathBuf::from("limactl"),
        Some(home.path().to_path_buf()),
    );

    let (result, diagnostics) = route(&runner, settings, &[]).await;

    let err = result.unwrap_err();
    assert!(err.is_already_reported());
    assert_eq!(err.to_exit_code(), ExitCode::INTERNAL);
    assert!(diagnostics.contains("currently in state \"Stopped\""));
    assert!(diagnostics.contains(RESTART_DIRECTIVE));
    assert!(runner.attached_commands().is_empty());
}

#[tokio::test]
async fn missing_instance_asks_for_creation() {
    let home = app_home();
    let runner = ScriptedRunner::new().probe_output(
        b"",
        b"level=fatal msg=\"No instance matching 0 found.\"\n",
        1,
    );
    let settings = settings(
        HostPlatform::Unix,
        PathBuf::from("limactl"),
        Some(home.path().to_path_buf()),
    );

    let (result, diagnostics) = route(&runner, settings, &[]).await;

    assert!(result.unwrap_err().is_already_reported());
    assert!(diagnostics.contains("The VM instance \"0\" needs to be created."));
}

#[tokio::test]
async fn missing_supervisor_gets_fallback_message() {
    let home = app_home();
    let runner = ScriptedRunner::new().probe_result(Err(RunnerError::SpawnFailed {
        program: "limactl".to_string(),
        reason: "No such file or directory".to_string(),
    }));
    let settings = settings(
        HostPlatform::Unix,
        PathBuf::from("limactl"),
        Some(home.path().to_path_buf()),
    );

    let (result, diagnostics) = route(&runner, settings, &[]).await;

    assert!(result.unwrap_err().is_already_reported());
    assert_eq!(diagnostics, "Underlying limactl check failed with no output.\n");
}

#[tokio::test]
async fn unexpected_stderr_is_shown_as_is() {
    let home = app_home();
    let runner = ScriptedRunner::new().probe_output(b"", b"open /x/lima: permission denied\n", 1);
    let settings = settings(
        HostPlatform::Unix,
        PathBuf::from("limactl"),
        Some(home.path().to_path_buf()),
    );

    let (_, diagnostics) = route(&runner, settings, &[]).await;

    assert_eq!(diagnostics, "open /x/lima: permission denied\n");
}

#[tokio::test]
async fn missing_supervisor_home_aborts_before_probing() {
    let empty_home = TempDir::new().unwrap();
    let runner = ScriptedRunner::new();
    let settings = settings(
        HostPlatform::Unix,
        PathBuf::from("limactl"),
        Some(empty_home.path().to_path_buf()),
    );

    let (result, diagnostics) = route(&runner, settings, &[]).await;

    let err = result.unwrap_err();
    assert!(matches!(err, VmShellError::EnvSetup(_)));
    assert!(err.display_for_user().contains("Can't find the supervisor home directory"));
    assert!(diagnostics.is_empty());
    assert!(runner.probed_commands().is_empty());
}

#[tokio::test]
async fn child_killed_by_signal_exits_one() {
    let home = app_home();
    let runner = ScriptedRunner::new()
        .probe_output(b"Running\n", b"", 0)
        .attached_result(Ok(None));
    let settings = settings(
        HostPlatform::Unix,
        PathBuf::from("limactl"),
        Some(home.path().to_path_buf()),
    );

    let (result, _) = route(&runner, settings, &args(&["sleep", "100"])).await;

    assert_eq!(result.unwrap(), ExitCode::INTERNAL);
}

#[tokio::test]
async fn cancelled_probe_never_launches() {
    let home = app_home();
    let runner = ScriptedRunner::new();
    let settings = settings(
        HostPlatform::Unix,
        PathBuf::from("limactl"),
        Some(home.path().to_path_buf()),
    );
    let cancel = CancellationToken::new();
    let probe_cancel = cancel.child_token();
    probe_cancel.cancel();
    let mut diagnostics = Vec::new();

    let result = execute_shell(
        &runner,
        settings,
        &[],
        &mut diagnostics,
        &probe_cancel,
        &cancel,
    )
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, VmShellError::Cancelled));
    assert_eq!(err.to_exit_code(), ExitCode::CANCELLED);
    assert!(runner.attached_commands().is_empty());
    assert!(!cancel.is_cancelled());
}

// ============================================================================
// Windows distributions
// ============================================================================

#[tokio::test]
async fn native_distribution_used_when_supervisor_absent() {
    let dir = TempDir::new().unwrap();
    let runner = ScriptedRunner::new()
        .probe_output(&wsl_table(&[("rancher-desktop", "Running")]), b"", 0);
    let settings = settings(HostPlatform::Windows, dir.path().join("limactl.exe"), None);

    let (result, diagnostics) = route(&runner, settings, &args(&["uname", "-a"])).await;

    assert_eq!(result.unwrap(), ExitCode::SUCCESS);
    assert!(diagnostics.is_empty());
    assert_eq!(runner.probed_commands(), vec!["wsl --list --verbose"]);
    let attached = runner.attached_commands();
    assert_eq!(
        attached[0].args,
        args(&[
            "--distribution",
            "rancher-desktop",
            "--exec",
            "/usr/local/bin/wsl-exec",
            "uname",
            "-a",
        ])
    );
    assert_eq!(attached[0].env, None);
}

#[tokio::test]
async fn supervisor_distribution_preferred_when_running() {
    let dir = TempDir::new().unwrap();
    let table = wsl_table(&[("rancher-desktop", "Running"), ("lima-0", "Running")]);
    let runner = ScriptedRunner::new().probe_output(&table, b"", 0);
    let settings = settings(HostPlatform::Windows, installed_supervisor(dir.path()), None);

    let (result, _) = route(&runner, settings, &[]).await;

    assert!(result.is_ok());
    assert_eq!(runner.probed_commands().len(), 1);
    assert_eq!(
        runner.attached_commands()[0].args,
        args(&["--distribution", "lima-0", "--exec", "/usr/local/bin/wsl-exec"])
    );
}

#[tokio::test]
async fn stopped_supervisor_distribution_falls_back_silently() {
    let dir = TempDir::new().unwrap();
    let table = wsl_table(&[("rancher-desktop", "Running"), ("lima-0", "Stopped")]);
    let runner = ScriptedRunner::new()
        .probe_output(&table, b"", 0)
        .probe_output(&table, b"", 0);
    let settings = settings(HostPlatform::Windows, installed_supervisor(dir.path()), None);

    let (result, diagnostics) = route(&runner, settings, &[]).await;

    assert!(result.is_ok());
    assert!(diagnostics.is_empty());
    assert_eq!(runner.probed_commands().len(), 2);
    assert_eq!(
        runner.attached_commands()[0].args[1],
        OsString::from("rancher-desktop")
    );
}

#[tokio::test]
async fn every_distribution_failing_reports_each() {
    let dir = TempDir::new().unwrap();
    let table = wsl_table(&[("lima-0", "Stopped")]);
    let runner = ScriptedRunner::new()
        .probe_output(&table, b"", 0)
        .probe_output(&table, b"", 0);
    let settings = settings(HostPlatform::Windows, installed_supervisor(dir.path()), None);

    let (result, diagnostics) = route(&runner, settings, &[]).await;

    assert!(result.unwrap_err().is_already_reported());
    let lines: Vec<&str> = diagnostics
        .lines()
        .filter(|line| line.starts_with("The WSL distribution"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("\"lima-0\"") && lines[0].contains("\"Stopped\""));
    assert!(lines[1].contains("\"rancher-desktop\"") && lines[1].contains("currently is not"));
    assert!(runner.attached_commands().is_empty());
}

#[tokio::test]
async fn malformed_wsl_output_is_a_probe_failure() {
    let dir = TempDir::new().unwrap();
    let mut garbled = utf16le("  NAME STATE\r\n");
    garbled.push(0x00);
    let runner = ScriptedRunner::new().probe_output(&garbled, b"", 0);
    let settings = settings(HostPlatform::Windows, dir.path().join("limactl.exe"), None);

    let (result, diagnostics) = route(&runner, settings, &[]).await;

    assert!(result.unwrap_err().is_already_reported());
    assert!(diagnostics.starts_with("Failed to read the WSL distribution list"));
}
