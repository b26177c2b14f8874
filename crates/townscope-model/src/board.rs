// ABOUTME: Kanban board projection of the issue list.
// ABOUTME: Four fixed columns; totals stay consistent with column counts.

use crate::issue::{IssueSummary, Status};
use serde::{Deserialize, Serialize};

/// One board column holding every issue in a given status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub status: Status,
    pub label: String,
    pub count: usize,
    pub issues: Vec<IssueSummary>,
}

impl Column {
    fn new(status: Status, label: &str) -> Self {
        Column {
            status,
            label: label.to_string(),
            count: 0,
            issues: Vec::new(),
        }
    }
}

/// Kanban board with the fixed column order the dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub columns: Vec<Column>,
    pub total: usize,
}

impl Board {
    pub fn new() -> Self {
        Board {
            columns: vec![
                Column::new(Status::Pending, "Pending"),
                Column::new(Status::InProgress, "In Progress"),
                Column::new(Status::Done, "Done"),
                Column::new(Status::Blocked, "Blocked"),
            ],
            total: 0,
        }
    }

    /// Place an issue in the column matching its status.
    pub fn add_issue(&mut self, issue: IssueSummary) {
        for column in &mut self.columns {
            if column.status == issue.status {
                column.count += 1;
                column.issues.push(issue);
                self.total += 1;
                return;
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}
