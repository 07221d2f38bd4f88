//! Scripted process runner shared by integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;
use vmshell::{
    CommandSpec, HostPlatform, ProcessOutput, ProcessRunner, RouterSettings, RunnerError,
};

/// Plays back canned results in order and records every command it sees.
#[derive(Default)]
pub struct ScriptedRunner {
    probes: Mutex<VecDeque<Result<ProcessOutput, RunnerError>>>,
    attached_status: Mutex<Option<Result<Option<i32>, RunnerError>>>,
    pub probed: Mutex<Vec<CommandSpec>>,
    pub attached: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next captured run.
    pub fn probe_result(self, result: Result<ProcessOutput, RunnerError>) -> Self {
        self.probes.lock().unwrap().push_back(result);
        self
    }

    pub fn probe_output(self, stdout: &[u8], stderr: &[u8], exit_code: i32) -> Self {
        self.probe_result(Ok(ProcessOutput::new(
            stdout.to_vec(),
            stderr.to_vec(),
            Some(exit_code),
        )))
    }

    /// Result of the attached launch.
    pub fn attached_result(self, result: Result<Option<i32>, RunnerError>) -> Self {
        *self.attached_status.lock().unwrap() = Some(result);
        self
    }

    pub fn probed_commands(&self) -> Vec<String> {
        self.probed.lock().unwrap().iter().map(ToString::to_string).collect()
    }

    pub fn attached_commands(&self) -> Vec<CommandSpec> {
        self.attached.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(
        &self,
        cmd: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<ProcessOutput, RunnerError> {
        self.probed.lock().unwrap().push(cmd.clone());
        if cancel.is_cancelled() {
            return Err(RunnerError::Cancelled {
                program: cmd.program.to_string_lossy().into_owned(),
            });
        }
        self.probes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected probe: {cmd}"))
    }

    async fn run_attached(
        &self,
        cmd: &CommandSpec,
        _cancel: &CancellationToken,
    ) -> Result<Option<i32>, RunnerError> {
        self.attached.lock().unwrap().push(cmd.clone());
        self.attached_status
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Ok(Some(0)))
    }
}

/// Encode text the way `wsl --list --verbose` writes it.
pub fn utf16le(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    bytes
}

/// A `wsl --list --verbose` table with the given `(name, state)` rows.
pub fn wsl_table(rows: &[(&str, &str)]) -> Vec<u8> {
    let mut text = String::from("  NAME                   STATE           VERSION\r\n");
    for (i, (name, state)) in rows.iter().enumerate() {
        let marker = if i == 0 { '*' } else { ' ' };
        text.push_str(&format!("{marker} {name:<22} {state:<15} 2\r\n"));
    }
    utf16le(&text)
}

pub fn args(items: &[&str]) -> Vec<OsString> {
    items.iter().map(OsString::from).collect()
}

pub const RESTART_DIRECTIVE: &str =
    "Start the VM from its management application first, then try again";

pub fn settings(
    host: HostPlatform,
    supervisor: PathBuf,
    app_home: Option<PathBuf>,
) -> RouterSettings {
    RouterSettings {
        host,
        supervisor,
        instance: "0".to_string(),
        supervisor_distribution: "lima-0".to_string(),
        distribution: "rancher-desktop".to_string(),
        bridge: "/usr/local/bin/wsl-exec".to_string(),
        restart_directive: RESTART_DIRECTIVE.to_string(),
        app_home,
        supervisor_home: None,
        search_path: Some(OsString::from("/usr/bin")),
    }
}
