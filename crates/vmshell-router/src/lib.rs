//! VM-shell routing for vmshell
//!
//! Decides which virtualization backend should receive a command and builds
//! the exact invocation that delivers it:
//!
//! - [`decode`]: normalizes helper output bytes (UTF-16LE for `wsl`)
//! - [`state`]: turns helper text into an [`InstanceState`]
//! - [`probe`]: runs a backend's status helper and classifies the result
//! - [`route`]: probes backends in priority order and picks exactly one
//!
//! All evidence comes from spawning host helpers (`limactl`, `wsl`) and
//! parsing what they print. Nothing here starts, stops or creates a VM.

pub mod backend;
pub mod decode;
pub mod host;
pub mod probe;
pub mod route;
pub mod state;

pub use backend::Backend;
pub use decode::{DecodeError, OutputEncoding, decode_output};
pub use host::HostPlatform;
pub use probe::probe;
pub use route::{RouteDecision, RouteError, Router, RouterSettings};
pub use state::{InstanceState, ProbeFailure};
