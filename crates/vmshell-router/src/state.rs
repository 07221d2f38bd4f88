//! Instance state model and helper-output parsers.

use std::fmt;

use crate::decode::DecodeError;

/// The only state token that counts as usable.
pub const RUNNING: &str = "Running";

/// Marker `wsl --list --verbose` puts in front of the default distribution.
const DEFAULT_MARKER: &str = "*";

/// Classified state of one backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceState {
    Running,
    /// The helper named a state other than `Running`, carried verbatim.
    OtherKnown(String),
    /// The helper ran but does not know the target.
    NotListed,
    /// The helper could not tell us anything.
    ProbeFailed(ProbeFailure),
}

impl InstanceState {
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    fn from_token(token: &str) -> Self {
        if token == RUNNING {
            Self::Running
        } else {
            Self::OtherKnown(token.to_string())
        }
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => f.write_str(RUNNING),
            Self::OtherKnown(state) => write!(f, "{state}"),
            Self::NotListed => f.write_str("not listed"),
            Self::ProbeFailed(failure) => write!(f, "probe failed: {failure}"),
        }
    }
}

/// Why a probe produced no usable evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    /// The helper could not be started.
    Spawn { command: String, reason: String },
    /// The helper exited unsuccessfully without usable stdout.
    Exited {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    /// The helper's output could not be decoded.
    Decode { command: String, error: DecodeError },
}

impl fmt::Display for ProbeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn { command, reason } => write!(f, "`{command}` could not start: {reason}"),
            Self::Exited {
                command, exit_code, ..
            } => match exit_code {
                Some(code) => write!(f, "`{command}` exited with status {code}"),
                None => write!(f, "`{command}` was terminated by a signal"),
            },
            Self::Decode { command, error } => write!(f, "`{command}`: {error}"),
        }
    }
}

/// Parse a single-status report (`limactl ls <instance> --format {{.Status}}`).
///
/// Trailing line endings are trimmed; an empty remainder means the instance
/// is not listed. `Running` is matched exactly, so `running` or ` Running`
/// come back as [`InstanceState::OtherKnown`].
#[must_use]
pub fn parse_single_status(text: &str) -> InstanceState {
    let token = text.trim_end_matches(['\n', '\r']);
    if token.is_empty() {
        InstanceState::NotListed
    } else {
        InstanceState::from_token(token)
    }
}

/// Find `target` in a `wsl --list --verbose` table.
///
/// Lines end in `\n` or `\r\n` and are split into whitespace-separated
/// fields; a leading `*` field marks the default distribution and is skipped.
/// The first line whose name field equals `target` exactly and carries a
/// state field decides the result. The header row needs no
/// special case: it only matches a distribution literally named `NAME`.
#[must_use]
pub fn parse_distribution_table(text: &str, target: &str) -> InstanceState {
    for line in text.lines() {
        let mut fields = line.split_whitespace().peekable();
        if fields.peek() == Some(&DEFAULT_MARKER) {
            fields.next();
        }

        let (Some(name), Some(state)) = (fields.next(), fields.next()) else {
            continue;
        };
        if name == target {
            return InstanceState::from_token(state);
        }
    }

    InstanceState::NotListed
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SAMPLE_TABLE: &str = "  NAME                    STATE           VERSION\r\n\
                                * rancher-desktop         Running         2\r\n  \
                                rancher-desktop-data    Stopped         2\r\n  \
                                lima-0                  Stopped         2\r\n";

    #[test]
    fn test_single_status_running() {
        assert_eq!(parse_single_status("Running\n"), InstanceState::Running);
        assert_eq!(parse_single_status("Running"), InstanceState::Running);
        assert_eq!(parse_single_status("Running\r\n"), InstanceState::Running);
    }

    #[test]
    fn test_single_status_other_states_verbatim() {
        assert_eq!(
            parse_single_status("Stopped\n"),
            InstanceState::OtherKnown("Stopped".to_string())
        );
        assert_eq!(
            parse_single_status("running\n"),
            InstanceState::OtherKnown("running".to_string())
        );
        assert_eq!(
            parse_single_status(" Running\n"),
            InstanceState::OtherKnown(" Running".to_string())
        );
    }

    #[test]
    fn test_single_status_empty_is_not_listed() {
        assert_eq!(parse_single_status(""), InstanceState::NotListed);
        assert_eq!(parse_single_status("\n"), InstanceState::NotListed);
    }

    #[test]
    fn test_table_default_marker_is_skipped() {
        assert_eq!(
            parse_distribution_table(SAMPLE_TABLE, "rancher-desktop"),
            InstanceState::Running
        );
    }

    #[test]
    fn test_table_other_state() {
        assert_eq!(
            parse_distribution_table(SAMPLE_TABLE, "lima-0"),
            InstanceState::OtherKnown("Stopped".to_string())
        );
    }

    #[test]
    fn test_table_exact_name_match() {
        // Prefixes and case variants of a listed name do not match.
        assert_eq!(
            parse_distribution_table(SAMPLE_TABLE, "rancher"),
            InstanceState::NotListed
        );
        assert_eq!(
            parse_distribution_table(SAMPLE_TABLE, "Rancher-Desktop"),
            InstanceState::NotListed
        );
    }

    #[test]
    fn test_table_missing_distribution() {
        assert_eq!(
            parse_distribution_table(SAMPLE_TABLE, "Ubuntu"),
            InstanceState::NotListed
        );
        assert_eq!(parse_distribution_table("", "Ubuntu"), InstanceState::NotListed);
    }

    #[test]
    fn test_table_line_without_state_is_ignored() {
        let text = "  lima-0\n  lima-0   Running   2\n";
        assert_eq!(parse_distribution_table(text, "lima-0"), InstanceState::Running);
    }

    #[test]
    fn test_table_tab_separated() {
        let text = "\tNAME\tSTATE\tVERSION\n*\tUbuntu\tRunning\t2\n";
        assert_eq!(parse_distribution_table(text, "Ubuntu"), InstanceState::Running);
    }

    #[test]
    fn test_table_header_only_matches_literal_name() {
        assert_eq!(
            parse_distribution_table(SAMPLE_TABLE, "NAME"),
            InstanceState::OtherKnown("STATE".to_string())
        );
    }

    #[test]
    fn test_probe_failure_display() {
        let failure = ProbeFailure::Exited {
            command: "wsl --list --verbose".to_string(),
            exit_code: Some(1),
            stderr: String::new(),
        };
        assert_eq!(
            failure.to_string(),
            "`wsl --list --verbose` exited with status 1"
        );
    }

    fn table_with(name: &str, state: &str, marked: bool, newline: &str) -> String {
        let marker = if marked { "* " } else { "  " };
        [
            "  NAME      STATE      VERSION".to_string(),
            "  other     Stopped    2".to_string(),
            format!("{marker}{name}    {state}    2"),
        ]
        .join(newline)
            + newline
    }

    proptest! {
        #[test]
        fn prop_only_running_token_is_running(token in "[A-Za-z ]{0,12}") {
            let state = parse_single_status(&format!("{token}\n"));
            prop_assert_eq!(state.is_running(), token == RUNNING);
        }

        #[test]
        fn prop_default_marker_and_newlines_do_not_matter(
            name in "[a-z][a-z0-9-]{0,15}",
            state in "(Running|Stopped|Installing)",
        ) {
            prop_assume!(name != "other");
            let baseline = parse_distribution_table(&table_with(&name, &state, false, "\n"), &name);
            for (marked, newline) in [(true, "\n"), (false, "\r\n"), (true, "\r\n")] {
                let table = table_with(&name, &state, marked, newline);
                let variant = parse_distribution_table(&table, &name);
                prop_assert_eq!(&variant, &baseline);
            }
            prop_assert_eq!(baseline.is_running(), state == RUNNING);
        }
    }
}
