//! Environment preparation for the VM supervisor.
//!
//! The supervisor (`limactl`) finds its instances through `LIMA_HOME` and may
//! need sibling tools from its own `bin` directory. Both are expressed as
//! environment overrides for child processes; the vmshell process's own
//! environment is never mutated.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::EnvSetupError;

/// Environment variable the supervisor reads its home directory from.
pub const SUPERVISOR_HOME_VAR: &str = "LIMA_HOME";

/// Process search path variable.
pub const SEARCH_PATH_VAR: &str = "PATH";

/// Name of the supervisor home directory under the application home.
pub const SUPERVISOR_HOME_DIR: &str = "lima";

/// An environment override destined for child processes.
pub type EnvOverride = (OsString, OsString);

/// Resolve and validate the supervisor home directory.
///
/// Uses `configured` when given, otherwise `<app_home>/lima`. The directory
/// must already exist: vmshell never creates VM state.
///
/// # Errors
/// [`EnvSetupError::SupervisorHomeMissing`] if nothing exists at the path,
/// [`EnvSetupError::SupervisorHomeNotDirectory`] if something else does.
pub fn ensure_supervisor_home(
    app_home: &Path,
    configured: Option<&Path>,
) -> Result<EnvOverride, EnvSetupError> {
    let candidate =
        configured.map_or_else(|| app_home.join(SUPERVISOR_HOME_DIR), Path::to_path_buf);

    let metadata = std::fs::metadata(&candidate).map_err(|_| {
        EnvSetupError::SupervisorHomeMissing {
            path: candidate.clone(),
        }
    })?;
    if !metadata.is_dir() {
        return Err(EnvSetupError::SupervisorHomeNotDirectory { path: candidate });
    }

    tracing::debug!(home = %candidate.display(), "Using supervisor home");
    Ok((OsString::from(SUPERVISOR_HOME_VAR), candidate.into_os_string()))
}

/// Make the supervisor's executable directory reachable on the search path.
///
/// `current` is the inherited search path value. Returns `Ok(None)` when
/// nothing needs to change: the executable is a bare name with no directory,
/// or its directory is already listed. Otherwise the directory is prepended
/// using the platform list separator.
///
/// # Errors
/// [`EnvSetupError::SearchPathJoin`] if the directory cannot be represented in
/// a search path (for example it contains the separator).
pub fn ensure_supervisor_on_path(
    supervisor: &Path,
    current: Option<&OsString>,
) -> Result<Option<EnvOverride>, EnvSetupError> {
    let Some(dir) = supervisor.parent().filter(|dir| !dir.as_os_str().is_empty()) else {
        return Ok(None);
    };

    let mut entries: Vec<PathBuf> = current
        .map(|value| std::env::split_paths(value).collect())
        .unwrap_or_default();
    if entries.iter().any(|entry| entry == dir) {
        return Ok(None);
    }
    entries.insert(0, dir.to_path_buf());

    let joined = std::env::join_paths(&entries).map_err(|e| EnvSetupError::SearchPathJoin {
        dir: dir.to_path_buf(),
        reason: e.to_string(),
    })?;

    tracing::debug!(dir = %dir.display(), "Prepending supervisor directory to search path");
    Ok(Some((OsString::from(SEARCH_PATH_VAR), joined)))
}
