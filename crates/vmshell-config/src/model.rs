use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Default supervisor instance name.
pub const DEFAULT_INSTANCE: &str = "0";

/// Default name of the native WSL distribution.
pub const DEFAULT_DISTRIBUTION: &str = "rancher-desktop";

/// Default in-guest entry point that `wsl --exec` hands the command to.
pub const DEFAULT_BRIDGE: &str = "/usr/local/bin/wsl-exec";

/// Default supervisor executable name, looked up on `PATH`.
pub const DEFAULT_SUPERVISOR: &str = "limactl";

/// Directory name under the platform data dir used as the application home.
pub const APP_DIR_NAME: &str = "vmshell";

/// Default remediation text appended to state diagnostics.
pub const DEFAULT_RESTART_DIRECTIVE: &str =
    "Start the VM from its management application first, then try again";

/// Source of a configuration value.
///
/// Precedence: CLI arguments > config file > built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    ConfigFile(PathBuf),
    Defaults,
}

impl ConfigSource {
    /// Stable label for display.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Cli => "cli",
            Self::ConfigFile(_) => "config",
            Self::Defaults => "default",
        }
    }
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub verbose: Option<bool>,
    pub instance: Option<String>,
    pub distribution: Option<String>,
    pub supervisor: Option<PathBuf>,
}

/// `[supervisor]` section: the POSIX VM supervisor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct SupervisorConfig {
    /// Explicit path to `limactl`; looked up on `PATH` when unset.
    pub executable: Option<PathBuf>,
    /// Instance to probe and shell into.
    pub instance: Option<String>,
    /// Supervisor home; `<app home>/lima` when unset.
    pub home: Option<PathBuf>,
}

/// `[wsl]` section: Windows subsystem distributions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct WslConfig {
    /// Native distribution name.
    pub distribution: Option<String>,
    /// Distribution backing the supervisor instance; `lima-<instance>` when unset.
    pub supervisor_distribution: Option<String>,
    /// In-guest bridge entry point.
    pub bridge: Option<String>,
}

/// `[app]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Application home; platform data dir + `vmshell` when unset.
    pub home: Option<PathBuf>,
    /// Remediation text appended to "VM not running" diagnostics.
    pub restart_directive: Option<String>,
    pub verbose: Option<bool>,
}

/// Effective configuration for one vmshell invocation.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > config file > built-in defaults.
///
/// # Discovery
///
/// [`Config::discover()`] searches for `.vmshell/config.toml` upward from the
/// current directory, stopping at a repository root.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub supervisor: SupervisorConfig,
    pub wsl: WslConfig,
    pub app: AppConfig,
    pub(crate) source_attribution: HashMap<String, ConfigSource>,
}

impl Config {
    /// Instance name the supervisor probe and launch target.
    #[must_use]
    pub fn instance(&self) -> &str {
        self.supervisor.instance.as_deref().unwrap_or(DEFAULT_INSTANCE)
    }

    /// Native WSL distribution name.
    #[must_use]
    pub fn distribution(&self) -> &str {
        self.wsl.distribution.as_deref().unwrap_or(DEFAULT_DISTRIBUTION)
    }

    /// WSL distribution that hosts the supervisor instance.
    #[must_use]
    pub fn supervisor_distribution(&self) -> String {
        self.wsl
            .supervisor_distribution
            .clone()
            .unwrap_or_else(|| format!("lima-{}", self.instance()))
    }

    /// In-guest bridge entry point.
    #[must_use]
    pub fn bridge(&self) -> &str {
        self.wsl.bridge.as_deref().unwrap_or(DEFAULT_BRIDGE)
    }

    #[must_use]
    pub fn restart_directive(&self) -> &str {
        self.app
            .restart_directive
            .as_deref()
            .unwrap_or(DEFAULT_RESTART_DIRECTIVE)
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.app.verbose.unwrap_or(false)
    }

    /// Resolve the supervisor executable.
    ///
    /// Configured path, else the first `limactl` on `PATH`, else the bare name
    /// (which then fails to spawn and is reported by the probe).
    #[must_use]
    pub fn supervisor_executable(&self) -> PathBuf {
        if let Some(path) = &self.supervisor.executable {
            return path.clone();
        }
        which::which(DEFAULT_SUPERVISOR).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Supervisor not found on PATH");
            PathBuf::from(DEFAULT_SUPERVISOR)
        })
    }

    /// Resolve the application home directory, if one can be determined.
    #[must_use]
    pub fn app_home(&self) -> Option<PathBuf> {
        self.app
            .home
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME)))
    }

    /// Where a key's effective value came from.
    #[must_use]
    pub fn source_of(&self, key: &str) -> &ConfigSource {
        self.source_attribution
            .get(key)
            .unwrap_or(&ConfigSource::Defaults)
    }

    /// Effective configuration as `key -> (value, source label)`.
    #[must_use]
    pub fn effective_config(&self) -> HashMap<String, (String, String)> {
        let mut config = HashMap::new();
        let mut add = |key: &str, value: String| {
            config.insert(
                key.to_string(),
                (value, self.source_of(key).label().to_string()),
            );
        };

        add("instance", self.instance().to_string());
        add("distribution", self.distribution().to_string());
        add("supervisor_distribution", self.supervisor_distribution());
        add("bridge", self.bridge().to_string());
        add("restart_directive", self.restart_directive().to_string());
        add("verbose", self.verbose().to_string());
        if let Some(path) = &self.supervisor.executable {
            add("supervisor", path.display().to_string());
        }
        if let Some(path) = &self.supervisor.home {
            add("supervisor_home", path.display().to_string());
        }
        if let Some(path) = &self.app.home {
            add("app_home", path.display().to_string());
        }

        config
    }
}
