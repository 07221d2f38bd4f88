//! Logging infrastructure for vmshell
//!
//! Stdout belongs to the in-VM command, so all log output goes to stderr.
//! The default level only lets warnings through: probe internals (helper
//! command lines, raw exit codes, spawn errors) are at `debug` and stay out of
//! the user's way unless `--verbose` or a filter env var asks for them.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable checked before `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "VMSHELL_LOG";

/// Build the filter: `VMSHELL_LOG`, then `RUST_LOG`, then the verbosity default.
fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "vmshell=debug,vmshell_router=debug,vmshell_runner=debug,vmshell_config=debug,info"
    } else {
        "warn"
    }
}

/// Initialize the tracing subscriber.
///
/// # Arguments
/// * `verbose` - If true, raise vmshell crates to `debug` and include targets
///
/// # Errors
/// Fails if a global subscriber was already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
