//! Route selection: probe candidates in priority order and pick one.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use vmshell_config::Config;
use vmshell_runner::{CommandSpec, ProcessRunner};
use vmshell_utils::error::{EnvSetupError, VmShellError};
use vmshell_utils::paths::{
    EnvOverride, SEARCH_PATH_VAR, ensure_supervisor_home, ensure_supervisor_on_path,
};

use crate::backend::Backend;
use crate::host::HostPlatform;
use crate::probe::{diagnostic, probe};

// ============================================================================
// Settings
// ============================================================================

/// Everything routing needs, resolved up front so selection itself touches
/// no process-global state beyond spawning helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterSettings {
    pub host: HostPlatform,
    /// Supervisor executable; on Windows its existence gates the
    /// supervisor-backed distribution.
    pub supervisor: PathBuf,
    pub instance: String,
    /// WSL distribution backing the supervisor instance.
    pub supervisor_distribution: String,
    /// Native WSL distribution.
    pub distribution: String,
    pub bridge: String,
    pub restart_directive: String,
    pub app_home: Option<PathBuf>,
    /// Explicit supervisor home; `<app_home>/lima` otherwise.
    pub supervisor_home: Option<PathBuf>,
    /// Inherited search path the supervisor directory is prepended to.
    pub search_path: Option<OsString>,
}

impl RouterSettings {
    /// Resolve settings from configuration and the current environment.
    #[must_use]
    pub fn from_config(config: &Config, host: HostPlatform) -> Self {
        Self {
            host,
            supervisor: config.supervisor_executable(),
            instance: config.instance().to_string(),
            supervisor_distribution: config.supervisor_distribution(),
            distribution: config.distribution().to_string(),
            bridge: config.bridge().to_string(),
            restart_directive: config.restart_directive().to_string(),
            app_home: config.app_home(),
            supervisor_home: config.supervisor.home.clone(),
            search_path: std::env::var_os(SEARCH_PATH_VAR),
        }
    }
}

// ============================================================================
// Decision and errors
// ============================================================================

/// The chosen backend and the exact command that enters it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    pub backend: Backend,
    pub command: CommandSpec,
}

/// Why no route was selected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Preparing the supervisor environment failed; nothing was probed.
    #[error(transparent)]
    EnvSetup(#[from] EnvSetupError),

    #[error("Cancelled while probing VM backends")]
    Cancelled,

    /// Every candidate failed and its diagnostics were already written.
    #[error("No running VM backend")]
    Reported,
}

impl From<RouteError> for VmShellError {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::EnvSetup(e) => Self::EnvSetup(e),
            RouteError::Cancelled => Self::Cancelled,
            RouteError::Reported => Self::AlreadyReported,
        }
    }
}

// ============================================================================
// Router
// ============================================================================

/// Probes backends through a [`ProcessRunner`] and selects the first running one.
pub struct Router<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
    settings: RouterSettings,
}

impl<'a, R: ProcessRunner + ?Sized> Router<'a, R> {
    pub fn new(runner: &'a R, settings: RouterSettings) -> Self {
        Self { runner, settings }
    }

    /// Candidate backends in priority order.
    ///
    /// Windows: the supervisor-backed distribution (only when the supervisor
    /// executable is installed at an absolute path), then the native
    /// distribution. Elsewhere: the
    /// supervisor instance alone.
    #[must_use]
    pub fn candidates(&self) -> Vec<Backend> {
        let settings = &self.settings;
        match settings.host {
            HostPlatform::Windows => {
                let mut candidates = Vec::with_capacity(2);
                if settings.supervisor.is_absolute() && settings.supervisor.exists() {
                    candidates.push(Backend::WindowsDistribution {
                        distribution: settings.supervisor_distribution.clone(),
                        bridge: settings.bridge.clone(),
                    });
                } else {
                    debug!(
                        supervisor = %settings.supervisor.display(),
                        "Supervisor not installed, skipping its distribution"
                    );
                }
                candidates.push(Backend::WindowsDistribution {
                    distribution: settings.distribution.clone(),
                    bridge: settings.bridge.clone(),
                });
                candidates
            }
            HostPlatform::Unix => vec![Backend::PosixSupervisor {
                executable: settings.supervisor.clone(),
                instance: settings.instance.clone(),
            }],
        }
    }

    /// Environment overrides every supervisor child needs.
    ///
    /// Empty on Windows, where the supervisor is never invoked directly.
    ///
    /// # Errors
    /// Any [`EnvSetupError`] from resolving the supervisor home or search path.
    pub fn prepare_environment(&self) -> Result<Vec<EnvOverride>, EnvSetupError> {
        let settings = &self.settings;
        if settings.host == HostPlatform::Windows {
            return Ok(Vec::new());
        }

        let configured_home = settings.supervisor_home.as_deref();
        let app_home = settings
            .app_home
            .as_deref()
            .or(configured_home)
            .ok_or(EnvSetupError::AppHomeUnavailable)?;

        let mut env = vec![ensure_supervisor_home(app_home, configured_home)?];
        if let Some(path) =
            ensure_supervisor_on_path(&settings.supervisor, settings.search_path.as_ref())?
        {
            env.push(path);
        }
        Ok(env)
    }

    /// Choose the backend that receives `args`.
    ///
    /// Environment preparation runs before any probe and aborts routing on
    /// failure. Candidates are probed in order and the first running one
    /// wins; diagnostics from earlier candidates are then only logged. When
    /// no candidate is running, one diagnostic per candidate goes to
    /// `diagnostics` and [`RouteError::Reported`] is returned.
    ///
    /// # Errors
    /// [`RouteError::EnvSetup`], [`RouteError::Cancelled`] or [`RouteError::Reported`].
    pub async fn select<W: Write>(
        &self,
        args: &[OsString],
        diagnostics: &mut W,
        cancel: &CancellationToken,
    ) -> Result<RouteDecision, RouteError> {
        let env = self.prepare_environment()?;
        let mut failures = Vec::new();

        for backend in self.candidates() {
            let state = probe(&backend, self.runner, &env, cancel)
                .await
                .map_err(|_| RouteError::Cancelled)?;

            if state.is_running() {
                for (skipped, message) in &failures {
                    debug!(backend = %skipped, message = %message, "Skipped backend");
                }
                let command = backend.launch_command(args).envs(env.iter().cloned());
                info!(backend = %backend, "Routing command");
                return Ok(RouteDecision { backend, command });
            }

            if let Some(message) = diagnostic(&backend, &state, &self.settings.restart_directive) {
                failures.push((backend, message));
            }
        }

        for (backend, message) in &failures {
            if let Err(e) = writeln!(diagnostics, "{message}") {
                debug!(backend = %backend, error = %e, "Failed to write diagnostic");
            }
        }
        Err(RouteError::Reported)
    }
}
