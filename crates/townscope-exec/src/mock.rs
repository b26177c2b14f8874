// ABOUTME: Canned-response executor for tests and offline development.
// ABOUTME: Keys on the joined argument list, falling back to the subcommand.

use crate::error::ExecError;
use crate::Executor;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// Failure a mock invocation should produce. Stored instead of [`ExecError`]
/// because the real error can wrap a non-clonable `std::io::Error`.
#[derive(Debug, Clone)]
pub enum MockFailure {
    ToolNotFound,
    NotInitialized(String),
    TargetNotFound(String),
    Failed(String),
}

impl MockFailure {
    fn into_error(self, command: &str) -> ExecError {
        match self {
            MockFailure::ToolNotFound => ExecError::ToolNotFound {
                tool: "mock".to_string(),
            },
            MockFailure::NotInitialized(message) => ExecError::NotInitialized {
                tool: "mock".to_string(),
                message,
            },
            MockFailure::TargetNotFound(id) => ExecError::TargetNotFound {
                id: if id.is_empty() { None } else { Some(id) },
            },
            MockFailure::Failed(stderr) => ExecError::Failed {
                tool: "mock".to_string(),
                command: command.to_string(),
                stderr,
                code: Some(1),
            },
        }
    }
}

/// Executor double returning configured responses without spawning anything.
#[derive(Debug, Default)]
pub struct MockExecutor {
    responses: HashMap<String, Vec<u8>>,
    failures: HashMap<String, MockFailure>,
}

impl MockExecutor {
    pub fn new() -> Self {
        MockExecutor::default()
    }

    /// Register stdout for a command, keyed by the space-joined args
    /// (or just the leading subcommand for a catch-all).
    pub fn respond(&mut self, command: &str, output: impl Into<Vec<u8>>) {
        self.responses.insert(command.to_string(), output.into());
    }

    pub fn fail(&mut self, command: &str, failure: MockFailure) {
        self.failures.insert(command.to_string(), failure);
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn run_with_env(
        &self,
        _work_dir: Option<&Path>,
        args: &[&str],
        _env: &[(&str, &str)],
    ) -> Result<Vec<u8>, ExecError> {
        let key = args.join(" ");

        if let Some(failure) = self.failures.get(&key) {
            return Err(failure.clone().into_error(&key));
        }
        if let Some(output) = self.responses.get(&key) {
            return Ok(output.clone());
        }

        if let Some(first) = args.first() {
            if let Some(failure) = self.failures.get(*first) {
                return Err(failure.clone().into_error(&key));
            }
            if let Some(output) = self.responses.get(*first) {
                return Ok(output.clone());
            }
        }

        Err(ExecError::Failed {
            tool: "mock".to_string(),
            command: key,
            stderr: "no response configured".to_string(),
            code: None,
        })
    }
}
