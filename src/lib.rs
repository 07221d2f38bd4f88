//! vmshell - run a shell or a command inside a managed VM
//!
//! One command line works the same on every host: vmshell finds out which
//! VM backend is actually running and hands the command to it untouched.
//!
//! - **macOS / Linux**: the `limactl` instance (default `0`), entered with
//!   `limactl shell <instance> ...`
//! - **Windows**: the supervisor-backed WSL distribution (`lima-<instance>`)
//!   when `limactl` is installed, otherwise the native distribution
//!   (default `rancher-desktop`), entered through `wsl --exec <bridge> ...`
//!
//! ```bash
//! # Interactive shell
//! vmshell shell
//!
//! # One command; flags belong to the command, not to vmshell
//! vmshell shell ls -CF /tmp
//!
//! # Several statements in one call
//! vmshell shell bash -c "cd .. ; pwd"
//! ```
//!
//! When nothing is running, vmshell explains why on stderr and exits 1
//! without starting anything.
//!
//! # Crates
//!
//! - `vmshell-runner`: argv-only process execution behind a trait
//! - `vmshell-router`: probing, state parsing and route selection
//! - `vmshell-config`: `.vmshell/config.toml` discovery and defaults
//! - `vmshell-utils`: errors, exit codes, logging, supervisor environment

pub mod cli;
pub mod shell;

pub use vmshell_config::{CliArgs, Config, ConfigSource};
pub use vmshell_router::{Backend, HostPlatform, RouteDecision, RouteError, Router, RouterSettings};
pub use vmshell_runner::{CommandSpec, NativeRunner, ProcessOutput, ProcessRunner, RunnerError};
pub use vmshell_utils::error::VmShellError;
pub use vmshell_utils::exit_codes::ExitCode;
