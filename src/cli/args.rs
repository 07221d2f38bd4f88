//! CLI argument definitions (clap)

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// vmshell - run commands inside a managed VM
#[derive(Parser, Debug)]
#[command(name = "vmshell")]
#[command(about = "Run an interactive shell or a command inside a managed VM")]
#[command(long_about = r#"
vmshell checks which VM backend is running on this host and runs your command
inside it: the limactl instance on macOS and Linux, a WSL distribution on
Windows.

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .vmshell/config.toml
  Use --config to specify an explicit config file path

LOGGING:
  Set VMSHELL_LOG (or RUST_LOG) to a tracing filter, e.g. VMSHELL_LOG=debug
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log probe details to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Supervisor instance to use
    #[arg(long)]
    pub instance: Option<String>,

    /// Native WSL distribution name (Windows)
    #[arg(long)]
    pub distribution: Option<String>,

    /// Path to the limactl executable
    #[arg(long)]
    pub supervisor: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an interactive shell or a command in the VM
    #[command(long_about = r#"Run an interactive shell or a command in the VM.

Everything after `shell` is passed to the VM verbatim, including flags.

EXAMPLES:
  vmshell shell
  -- opens a shell in the VM

  vmshell shell ls -CF /tmp
  -- runs `ls -CF /tmp` in the VM

  vmshell shell bash -c "cd .. ; pwd"
  -- usual way of running multiple statements on a single call
"#)]
    #[command(disable_help_flag = true)]
    Shell {
        /// Command and arguments to run in the VM (default: login shell)
        #[arg(
            value_name = "COMMAND",
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        args: Vec<OsString>,
    },
}

/// The words after the `shell` subcommand, exactly as they were given.
///
/// clap swallows a leading `--` in the trailing list, so dispatch takes the
/// tail straight from `raw` instead. Options before `shell` are skipped
/// along with their values, using the clap definition to know which take
/// one. Returns `None` when `raw` does not invoke `shell`.
#[must_use]
pub fn shell_tail(raw: &[OsString]) -> Option<Vec<OsString>> {
    let cli = build_cli();
    let mut words = raw.iter().skip(1);

    while let Some(word) = words.next() {
        let text = word.to_str()?;
        if text == "--" {
            return None;
        }
        if let Some(long) = text.strip_prefix("--") {
            if !long.contains('=') && takes_value(&cli, |arg| arg.get_long() == Some(long)) {
                words.next();
            }
            continue;
        }
        if let Some(short) = text.strip_prefix('-').filter(|short| !short.is_empty()) {
            let mut flags = short.chars();
            let first = flags.next();
            if flags.next().is_none() && takes_value(&cli, |arg| arg.get_short() == first) {
                words.next();
            }
            continue;
        }
        return (text == "shell").then(|| words.cloned().collect());
    }

    None
}

fn takes_value(cli: &clap::Command, matches: impl Fn(&clap::Arg) -> bool) -> bool {
    cli.get_arguments()
        .any(|arg| matches(arg) && arg.get_action().takes_values())
}

/// Help flags recognised as the first word after `shell`.
pub const HELP_FLAGS: [&str; 2] = ["-h", "--help"];

/// Whether the `shell` arguments ask for help rather than name a command.
#[must_use]
pub fn is_help_request(args: &[OsString]) -> bool {
    args.first()
        .is_some_and(|first| HELP_FLAGS.iter().any(|flag| first == flag))
}

/// Build the clap `Command` for help rendering.
#[must_use]
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
