use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use tokio::process::Command as TokioCommand;

// ============================================================================
// CommandSpec - Argv-Style Process Specification
// ============================================================================

/// Specification for a command to execute.
///
/// Every helper query and every final shell launch goes through this type, so
/// user arguments always reach the child as discrete elements rather than as a
/// shell string that something would have to re-quote.
///
/// # Example
///
/// ```rust
/// use vmshell_runner::CommandSpec;
/// use std::ffi::OsString;
///
/// let cmd = CommandSpec::new("limactl")
///     .arg("shell")
///     .arg("default")
///     .args(["ls", "-CF", "/tmp"]);
///
/// assert_eq!(cmd.program, OsString::from("limactl"));
/// assert_eq!(cmd.args.len(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as discrete elements (NOT shell strings)
    pub args: Vec<OsString>,
    /// Environment overrides layered on top of the inherited environment
    pub env: Option<HashMap<OsString, OsString>>,
}

impl CommandSpec {
    /// Create a new `CommandSpec` with the given program.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: None,
        }
    }

    /// Add a single argument to the command.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments to the command, preserving their order.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the command.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set multiple environment variables for the command.
    ///
    /// An empty iterator leaves `env` untouched, so a spec built without
    /// overrides still compares equal to one built with none.
    #[must_use]
    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        for (key, value) in envs {
            self = self.env(key, value);
        }
        self
    }

    /// Look up an environment override by name.
    #[must_use]
    pub fn env_value(&self, key: &str) -> Option<&OsString> {
        self.env.as_ref()?.get(&OsString::from(key))
    }

    /// Convert this `CommandSpec` into a `tokio::process::Command`.
    ///
    /// Stdio is left at its defaults; the runner decides whether output is
    /// captured or inherited.
    #[must_use]
    pub fn to_tokio_command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref env) = self.env {
            for (key, value) in env {
                cmd.env(key, value);
            }
        }

        cmd
    }
}

impl fmt::Display for CommandSpec {
    /// Human-readable rendering for logs only. Never fed back to a shell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
