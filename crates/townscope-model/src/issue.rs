// ABOUTME: Issue, summary, and filter types for the tracker views.
// ABOUTME: Status and priority enums use the tracker's wire vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Workflow state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    InProgress,
    Done,
    Blocked,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::InProgress => "in_progress",
            Status::Done => "done",
            Status::Blocked => "blocked",
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Status::Pending
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lightweight reference to an issue, used for dependency lists and board cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueSummary {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub priority: Priority,
}

/// Fully hydrated issue as shown in the detail view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<IssueSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<IssueSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<IssueSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocked_by: Vec<IssueSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub done_when: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Query filter for issue listings. Only `status` reaches the tracker;
/// the rest is applied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueFilter {
    pub status: Option<Status>,
    pub parent: Option<String>,
    pub search: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for IssueFilter {
    fn default() -> Self {
        IssueFilter {
            status: None,
            parent: None,
            search: None,
            limit: 100,
            offset: 0,
        }
    }
}

impl IssueFilter {
    pub fn with_status(status: Status) -> Self {
        IssueFilter {
            status: Some(status),
            ..Default::default()
        }
    }
}
