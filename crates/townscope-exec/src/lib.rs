// ABOUTME: Subprocess seam for the external CLIs the engine observes.
// ABOUTME: Executor trait, tokio-backed CliExecutor, and the MockExecutor double.

mod cli;
mod error;
mod mock;

pub use cli::{CliExecutor, DEFAULT_TIMEOUT};
pub use error::ExecError;
pub use mock::{MockExecutor, MockFailure};

use async_trait::async_trait;
use std::path::Path;

/// Runs an external tool and returns its stdout.
///
/// Implementations classify failures into [`ExecError`] so callers can tell a
/// missing tool from an uninitialized store from a missing entity without
/// re-parsing stderr themselves.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run with extra environment variables applied to the child.
    async fn run_with_env(
        &self,
        work_dir: Option<&Path>,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> Result<Vec<u8>, ExecError>;

    /// Run with the inherited environment.
    async fn run(&self, work_dir: Option<&Path>, args: &[&str]) -> Result<Vec<u8>, ExecError> {
        self.run_with_env(work_dir, args, &[]).await
    }
}
