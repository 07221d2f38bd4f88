//! Configuration for vmshell
//!
//! Precedence is CLI flags > `.vmshell/config.toml` > built-in defaults. The
//! defaults target the supervisor instance `0`, its `lima-0` WSL distribution
//! and the native `rancher-desktop` distribution.
//!
//! ```toml
//! [supervisor]
//! executable = "/opt/lima/bin/limactl"
//! instance = "0"
//!
//! [wsl]
//! distribution = "rancher-desktop"
//! bridge = "/usr/local/bin/wsl-exec"
//!
//! [app]
//! restart_directive = "Start the desktop application first"
//! ```

mod discovery;
mod model;

pub use discovery::{CONFIG_DIR, CONFIG_FILE};
pub use model::{
    APP_DIR_NAME, AppConfig, CliArgs, Config, ConfigSource, DEFAULT_BRIDGE, DEFAULT_DISTRIBUTION,
    DEFAULT_INSTANCE, DEFAULT_RESTART_DIRECTIVE, DEFAULT_SUPERVISOR, SupervisorConfig, WslConfig,
};
