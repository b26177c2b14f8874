// ABOUTME: Real subprocess executor backed by tokio::process.
// ABOUTME: Piped stdio, kill-on-drop children, and a per-invocation deadline.

use crate::error::{classify, ExecError};
use crate::Executor;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executor that shells out to one named tool.
#[derive(Debug, Clone)]
pub struct CliExecutor {
    tool: String,
    timeout: Duration,
}

impl CliExecutor {
    pub fn new(tool: impl Into<String>) -> Self {
        CliExecutor {
            tool: tool.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }
}

#[async_trait]
impl Executor for CliExecutor {
    async fn run_with_env(
        &self,
        work_dir: Option<&Path>,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<Vec<u8>, ExecError> {
        let mut cmd = Command::new(&self.tool);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = work_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in env {
            cmd.env(key, value);
        }

        let child = cmd.spawn().map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ExecError::ToolNotFound {
                    tool: self.tool.clone(),
                }
            } else {
                ExecError::Io {
                    tool: self.tool.clone(),
                    source: err,
                }
            }
        })?;

        // On timeout the wait future is dropped, and kill_on_drop reaps the child.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return Err(ExecError::Io {
                    tool: self.tool.clone(),
                    source: err,
                })
            }
            Err(_) => {
                tracing::warn!(
                    tool = %self.tool,
                    command = %args.join(" "),
                    timeout_secs = self.timeout.as_secs(),
                    "command timed out, child killed"
                );
                return Err(ExecError::Timeout {
                    tool: self.tool.clone(),
                    command: args.join(" "),
                    timeout: self.timeout,
                });
            }
        };

        if output.status.success() {
            return Ok(output.stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(classify(&self.tool, args, &stderr, output.status.code()))
    }
}
