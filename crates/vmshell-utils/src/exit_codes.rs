//! Exit code constants for vmshell.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | The in-VM command exited 0 |
//! | 1 | `INTERNAL` | Routing failure or internal error |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 130 | `CANCELLED` | Interrupted before the VM command could run |
//!
//! Any other value is the in-VM command's own exit code, forwarded verbatim.

/// Process exit code.
///
/// Use the named constants for vmshell's own outcomes and
/// [`from_i32()`](Self::from_i32) to forward the in-VM command's status.
///
/// # Example
///
/// ```rust
/// use vmshell_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::from_i32(42).as_i32(), 42);
/// assert_eq!(ExitCode::from_child(None), ExitCode::INTERNAL);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - the in-VM command completed with status 0
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - routing failed or an unexpected error occurred
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Cancelled - interrupted while probing or waiting
    pub const CANCELLED: ExitCode = ExitCode(130);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an `ExitCode` from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    /// Map a child's exit status onto ours.
    ///
    /// `None` (terminated by a signal) has no code to forward and maps to
    /// [`INTERNAL`](Self::INTERNAL).
    #[must_use]
    pub const fn from_child(code: Option<i32>) -> Self {
        match code {
            Some(code) => ExitCode(code),
            None => Self::INTERNAL,
        }
    }

    /// True for status 0.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
