use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::{AppConfig, CliArgs, Config, ConfigSource, SupervisorConfig, WslConfig};

/// Directory holding the config file, searched upward from the start dir.
pub const CONFIG_DIR: &str = ".vmshell";

/// Config file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
struct TomlConfig {
    supervisor: Option<SupervisorConfig>,
    wsl: Option<WslConfig>,
    app: Option<AppConfig>,
}

/// Copy `value` into `slot` and record where it came from, when present.
fn apply<T: Clone>(
    slot: &mut Option<T>,
    value: Option<&T>,
    key: &str,
    source: &ConfigSource,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    if let Some(value) = value {
        *slot = Some(value.clone());
        attribution.insert(key.to_string(), source.clone());
    }
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global state.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let mut attribution = HashMap::new();
        let mut supervisor = SupervisorConfig::default();
        let mut wsl = WslConfig::default();
        let mut app = AppConfig::default();

        let config_path = if let Some(explicit_path) = &cli_args.config_path {
            Some(explicit_path.clone())
        } else {
            Self::discover_config_file_from(start_dir)?
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            let source = ConfigSource::ConfigFile(path.clone());
            tracing::debug!(path = %path.display(), "Loaded config file");

            if let Some(file) = file_config.supervisor {
                apply(
                    &mut supervisor.executable,
                    file.executable.as_ref(),
                    "supervisor",
                    &source,
                    &mut attribution,
                );
                apply(
                    &mut supervisor.instance,
                    file.instance.as_ref(),
                    "instance",
                    &source,
                    &mut attribution,
                );
                apply(
                    &mut supervisor.home,
                    file.home.as_ref(),
                    "supervisor_home",
                    &source,
                    &mut attribution,
                );
            }
            if let Some(file) = file_config.wsl {
                apply(
                    &mut wsl.distribution,
                    file.distribution.as_ref(),
                    "distribution",
                    &source,
                    &mut attribution,
                );
                apply(
                    &mut wsl.supervisor_distribution,
                    file.supervisor_distribution.as_ref(),
                    "supervisor_distribution",
                    &source,
                    &mut attribution,
                );
                apply(&mut wsl.bridge, file.bridge.as_ref(), "bridge", &source, &mut attribution);
            }
            if let Some(file) = file_config.app {
                apply(&mut app.home, file.home.as_ref(), "app_home", &source, &mut attribution);
                apply(
                    &mut app.restart_directive,
                    file.restart_directive.as_ref(),
                    "restart_directive",
                    &source,
                    &mut attribution,
                );
                apply(
                    &mut app.verbose,
                    file.verbose.as_ref(),
                    "verbose",
                    &source,
                    &mut attribution,
                );
            }
        }

        // CLI flags override everything
        let cli = ConfigSource::Cli;
        apply(
            &mut supervisor.instance,
            cli_args.instance.as_ref(),
            "instance",
            &cli,
            &mut attribution,
        );
        apply(
            &mut supervisor.executable,
            cli_args.supervisor.as_ref(),
            "supervisor",
            &cli,
            &mut attribution,
        );
        apply(
            &mut wsl.distribution,
            cli_args.distribution.as_ref(),
            "distribution",
            &cli,
            &mut attribution,
        );
        if cli_args.verbose == Some(true) {
            apply(&mut app.verbose, Some(&true), "verbose", &cli, &mut attribution);
        }

        Ok(Self {
            supervisor,
            wsl,
            app,
            source_attribution: attribution,
        })
    }

    /// Search upward from `start_dir` for `.vmshell/config.toml`.
    ///
    /// Stops at the filesystem root or at the first repository root
    /// (`.git`, `.hg`, `.svn`) without a config file.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = Some(start_dir);

        while let Some(dir) = current_dir {
            let config_path = dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Ok(Some(config_path));
            }

            if dir.join(".git").exists() || dir.join(".hg").exists() || dir.join(".svn").exists()
            {
                break;
            }

            current_dir = dir.parent();
        }

        Ok(None)
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config file: {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Missing config file is OK - defaults apply
                Ok(TomlConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {e}",
                path.display()
            )),
        }
    }
}
