// ABOUTME: Typed subprocess failure taxonomy and the stderr classifier.
// ABOUTME: All heuristic stderr matching lives in classify(), nowhere else.

use std::time::Duration;
use thiserror::Error;

/// Why a tool invocation failed.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The executable is not installed or not on PATH.
    #[error("`{tool}` not found in PATH")]
    ToolNotFound { tool: String },

    /// The tool reported its data store has not been set up.
    #[error("{tool} not initialized: {message}")]
    NotInitialized { tool: String, message: String },

    /// The tool reported the requested entity does not exist.
    #[error("target not found: {}", .id.as_deref().unwrap_or("?"))]
    TargetNotFound { id: Option<String> },

    /// The tool exited abnormally for any other reason.
    #[error("{tool} {command} failed: {stderr}")]
    Failed {
        tool: String,
        command: String,
        stderr: String,
        code: Option<i32>,
    },

    /// Spawning or waiting on the child failed at the OS level.
    #[error("failed to run {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The invocation exceeded its deadline and the child was killed.
    #[error("{tool} {command} timed out after {}s", .timeout.as_secs())]
    Timeout {
        tool: String,
        command: String,
        timeout: Duration,
    },
}

/// Sort a non-zero exit into the taxonomy from its (trimmed) stderr.
///
/// The markers are the ones the observed tools actually print; anything
/// unrecognized stays a plain `Failed`.
pub(crate) fn classify(tool: &str, args: &[&str], stderr: &str, code: Option<i32>) -> ExecError {
    if stderr.contains("not initialized") || stderr.contains("no .beads") {
        return ExecError::NotInitialized {
            tool: tool.to_string(),
            message: stderr.to_string(),
        };
    }

    if stderr.contains("not found") || stderr.contains("does not exist") {
        return ExecError::TargetNotFound {
            id: target_id(args),
        };
    }

    ExecError::Failed {
        tool: tool.to_string(),
        command: args.join(" "),
        stderr: stderr.to_string(),
        code,
    }
}

/// Recover the entity id from a `show <id>` style invocation, when present.
fn target_id(args: &[&str]) -> Option<String> {
    args.windows(2)
        .find(|pair| pair[0] == "show")
        .map(|pair| pair[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_not_initialized() {
        let err = classify("bd", &["status"], "Error: beads not initialized in this directory", Some(1));
        match err {
            ExecError::NotInitialized { tool, message } => {
                assert_eq!(tool, "bd");
                assert!(message.contains("not initialized"));
            }
            other => panic!("unexpected classification: {other}"),
        }
    }

    #[test]
    fn test_classify_missing_database_marker() {
        let err = classify("bd", &["list", "--json"], "no .beads directory found", Some(1));
        assert!(matches!(err, ExecError::NotInitialized { .. }));
    }

    #[test]
    fn test_classify_not_found_recovers_show_id() {
        let err = classify("bd", &["show", "tw-42", "--json"], "issue not found", Some(1));
        match err {
            ExecError::TargetNotFound { id } => assert_eq!(id.as_deref(), Some("tw-42")),
            other => panic!("unexpected classification: {other}"),
        }
    }

    #[test]
    fn test_classify_does_not_exist_without_id() {
        let err = classify("bd", &["list", "--json"], "record does not exist", Some(1));
        match err {
            ExecError::TargetNotFound { id } => assert!(id.is_none()),
            other => panic!("unexpected classification: {other}"),
        }
    }

    #[test]
    fn test_classify_fallthrough_keeps_command_and_code() {
        let err = classify("bd", &["list", "--json"], "segfault", Some(139));
        match err {
            ExecError::Failed { command, stderr, code, .. } => {
                assert_eq!(command, "list --json");
                assert_eq!(stderr, "segfault");
                assert_eq!(code, Some(139));
            }
            other => panic!("unexpected classification: {other}"),
        }
    }

    #[test]
    fn test_initialized_marker_wins_over_not_found() {
        // Both markers present: the initialization check runs first.
        let err = classify("bd", &["show", "x"], "db not initialized, file not found", Some(1));
        assert!(matches!(err, ExecError::NotInitialized { .. }));
    }
}
