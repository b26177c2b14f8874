// ABOUTME: Tracker-facing error taxonomy wrapping executor failures.
// ABOUTME: Classified subprocess errors route into domain variants via From.

use thiserror::Error;
use townscope_exec::ExecError;

/// Why a tracker query failed.
#[derive(Debug, Error)]
pub enum BeadsError {
    /// The bd CLI is not installed or not on PATH.
    #[error("bd CLI not found in PATH; install Beads to enable tracker views")]
    ToolNotFound,

    /// No tracker database in the working directory.
    #[error("beads not initialized: {0}")]
    NotInitialized(String),

    /// The requested issue does not exist.
    #[error("issue not found: {id}")]
    NotFound { id: String },

    /// bd produced output the parser could not decode.
    #[error("failed to parse bd {command} output")]
    Parse {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    /// Any other execution failure, kept with its classification intact.
    #[error(transparent)]
    Execution(ExecError),
}

impl From<ExecError> for BeadsError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::ToolNotFound { .. } => BeadsError::ToolNotFound,
            ExecError::NotInitialized { message, .. } => BeadsError::NotInitialized(message),
            ExecError::TargetNotFound { id } => BeadsError::NotFound {
                id: id.unwrap_or_default(),
            },
            other => BeadsError::Execution(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classified_errors_route_to_domain_variants() {
        let err: BeadsError = ExecError::ToolNotFound {
            tool: "bd".to_string(),
        }
        .into();
        assert!(matches!(err, BeadsError::ToolNotFound));

        let err: BeadsError = ExecError::NotInitialized {
            tool: "bd".to_string(),
            message: "no .beads directory".to_string(),
        }
        .into();
        match err {
            BeadsError::NotInitialized(message) => assert_eq!(message, "no .beads directory"),
            other => panic!("unexpected variant: {other}"),
        }

        let err: BeadsError = ExecError::TargetNotFound {
            id: Some("tw-7".to_string()),
        }
        .into();
        match err {
            BeadsError::NotFound { id } => assert_eq!(id, "tw-7"),
            other => panic!("unexpected variant: {other}"),
        }
    }

    #[test]
    fn test_residual_failures_stay_execution() {
        let err: BeadsError = ExecError::Failed {
            tool: "bd".to_string(),
            command: "list --json".to_string(),
            stderr: "disk on fire".to_string(),
            code: Some(2),
        }
        .into();
        assert!(matches!(err, BeadsError::Execution(_)));
        assert!(err.to_string().contains("disk on fire"));
    }
}
