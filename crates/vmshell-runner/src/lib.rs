//! Process execution for vmshell
//!
//! Every helper probe and the final shell launch are described by a
//! [`CommandSpec`] and executed through a [`ProcessRunner`]. Waits race a
//! caller-supplied `CancellationToken`; the runner itself never times out or
//! retries.
//!
//! # Security Model
//!
//! Arguments are passed as discrete `OsString` elements. No `sh -c` or
//! `cmd /C` evaluation happens anywhere in this crate.

pub mod command_spec;
pub mod error;
pub mod native;
pub mod process;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use native::NativeRunner;
pub use process::{ProcessOutput, ProcessRunner};
