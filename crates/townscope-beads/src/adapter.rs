// ABOUTME: Tracker capability trait and its bd-CLI implementation.
// ABOUTME: Every query is one subprocess round trip plus a typed parse.

use crate::error::BeadsError;
use crate::parser::{self, RawIssue};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use townscope_exec::{CliExecutor, ExecError, Executor};
use townscope_model::{
    Board, EdgeType, Graph, GraphEdge, GraphNode, Issue, IssueFilter, IssueSummary,
};

/// Read-only queries against the Beads tracker.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// All issues matching the filter.
    async fn list_issues(&self, filter: IssueFilter) -> Result<Vec<Issue>, BeadsError>;

    /// One issue with full details.
    async fn get_issue(&self, id: &str) -> Result<Issue, BeadsError>;

    /// Issues grouped by status for the board view.
    async fn board(&self) -> Result<Board, BeadsError>;

    /// The dependency graph over all issues.
    async fn graph(&self) -> Result<Graph, BeadsError>;

    /// Whether a tracker database exists in the working directory.
    async fn is_initialized(&self) -> Result<bool, BeadsError>;

    /// The bd CLI version string.
    async fn version(&self) -> Result<String, BeadsError>;
}

/// Adapter that shells out to the bd CLI.
pub struct CliAdapter {
    executor: Arc<dyn Executor>,
    work_dir: Option<PathBuf>,
}

impl CliAdapter {
    /// Query bd in `work_dir`, or the process working directory when None.
    pub fn new(work_dir: Option<PathBuf>) -> Self {
        CliAdapter {
            executor: Arc::new(CliExecutor::new("bd")),
            work_dir,
        }
    }

    /// Substitute the executor, used by tests and offline mode.
    pub fn with_executor(work_dir: Option<PathBuf>, executor: Arc<dyn Executor>) -> Self {
        CliAdapter { executor, work_dir }
    }
}

#[async_trait]
impl Adapter for CliAdapter {
    async fn list_issues(&self, filter: IssueFilter) -> Result<Vec<Issue>, BeadsError> {
        let mut args = vec!["list", "--json"];
        if let Some(status) = filter.status {
            args.push("--status");
            args.push(status.as_str());
        }

        let output = self.executor.run(self.work_dir.as_deref(), &args).await?;
        let raw = parser::parse_issue_list(&output).map_err(|err| BeadsError::Parse {
            command: "list".to_string(),
            source: err,
        })?;

        Ok(raw.iter().map(RawIssue::to_issue).collect())
    }

    async fn get_issue(&self, id: &str) -> Result<Issue, BeadsError> {
        let result = self
            .executor
            .run(self.work_dir.as_deref(), &["show", id, "--json"])
            .await;
        let output = match result {
            Ok(output) => output,
            Err(ExecError::TargetNotFound { .. }) => {
                return Err(BeadsError::NotFound { id: id.to_string() })
            }
            Err(err) => return Err(err.into()),
        };

        let raw = parser::parse_issue_list(&output).map_err(|err| BeadsError::Parse {
            command: "show".to_string(),
            source: err,
        })?;

        match raw.first() {
            Some(found) => Ok(found.to_issue()),
            None => Err(BeadsError::NotFound { id: id.to_string() }),
        }
    }

    async fn board(&self) -> Result<Board, BeadsError> {
        let issues = self.list_issues(IssueFilter::default()).await?;

        let mut board = Board::new();
        for issue in issues {
            board.add_issue(IssueSummary {
                id: issue.id,
                title: issue.title,
                status: issue.status,
                priority: issue.priority,
            });
        }

        Ok(board)
    }

    async fn graph(&self) -> Result<Graph, BeadsError> {
        let issues = self.list_issues(IssueFilter::default()).await?;

        let mut graph = Graph::new();
        let mut known: HashSet<String> = HashSet::with_capacity(issues.len());
        for issue in &issues {
            graph.add_node(GraphNode {
                id: issue.id.clone(),
                title: issue.title.clone(),
                status: issue.status,
                priority: issue.priority,
            });
            known.insert(issue.id.clone());
        }

        // The blocked query legitimately fails when nothing is blocked;
        // the graph then ships with nodes and no edges.
        let result = self
            .executor
            .run(self.work_dir.as_deref(), &["blocked", "--json"])
            .await;
        let output = match result {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!(error = %err, "blocked query failed, graph has no edges");
                return Ok(graph);
            }
        };

        let blocked = match parser::parse_blocked_list(&output) {
            Ok(blocked) => blocked,
            Err(err) => {
                tracing::debug!(error = %err, "blocked output unparseable, graph has no edges");
                return Ok(graph);
            }
        };

        for entry in &blocked {
            for blocker in &entry.blocked_by {
                if known.contains(blocker.as_str()) && known.contains(entry.id.as_str()) {
                    graph.add_edge(GraphEdge {
                        from: blocker.clone(),
                        to: entry.id.clone(),
                        kind: EdgeType::Blocks,
                    });
                }
            }
        }

        Ok(graph)
    }

    async fn is_initialized(&self) -> Result<bool, BeadsError> {
        match self.executor.run(self.work_dir.as_deref(), &["status"]).await {
            Ok(_) => Ok(true),
            Err(ExecError::NotInitialized { .. }) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn version(&self) -> Result<String, BeadsError> {
        let output = self
            .executor
            .run(self.work_dir.as_deref(), &["--version"])
            .await?;
        Ok(parser::parse_version(&output))
    }
}
