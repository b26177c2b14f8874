// ABOUTME: Decoders for bd CLI JSON and banner output.
// ABOUTME: Raw records, status/priority maps, and done-when extraction.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use townscope_model::{Issue, IssueSummary, Priority, Status};

/// Issue record as bd emits it. Dependency entries are the same shape,
/// tagged with the relation that links them to the parent record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIssue {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub issue_type: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub dependencies: Vec<RawIssue>,
    #[serde(default)]
    pub dependents: Vec<RawIssue>,
    #[serde(default, rename = "dependency_type")]
    pub dep_type: String,
}

impl RawIssue {
    /// Convert to the domain issue, projecting dependency relations onto
    /// parent/children/blocks/blocked_by.
    pub fn to_issue(&self) -> Issue {
        let mut issue = Issue {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            status: map_status(&self.status),
            priority: map_priority(self.priority),
            parent: None,
            children: Vec::new(),
            blocks: Vec::new(),
            blocked_by: Vec::new(),
            done_when: parse_done_when(&self.description),
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        for dep in &self.dependencies {
            match dep.dep_type.as_str() {
                "blocks" => issue.blocked_by.push(dep.to_summary()),
                "parent-child" => issue.parent = Some(dep.to_summary()),
                "" => {}
                other => tracing::debug!(
                    issue = %self.id,
                    relation = %other,
                    "dropping unrecognized dependency relation"
                ),
            }
        }

        for dep in &self.dependents {
            match dep.dep_type.as_str() {
                "blocks" => issue.blocks.push(dep.to_summary()),
                "parent-child" => issue.children.push(dep.to_summary()),
                "" => {}
                other => tracing::debug!(
                    issue = %self.id,
                    relation = %other,
                    "dropping unrecognized dependent relation"
                ),
            }
        }

        issue
    }

    pub fn to_summary(&self) -> IssueSummary {
        IssueSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            status: map_status(&self.status),
            priority: map_priority(self.priority),
        }
    }
}

/// Blocked-issue record from `bd blocked --json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawBlockedIssue {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub blocked_by_count: i64,
    #[serde(default)]
    pub blocked_by: Vec<String>,
}

/// Map a bd status string onto the four-state model. Unknown values fall
/// open to Pending so a tracker upgrade cannot take the board down.
pub fn map_status(raw: &str) -> Status {
    match raw.to_lowercase().as_str() {
        "open" | "pending" => Status::Pending,
        "in_progress" | "in-progress" | "inprogress" => Status::InProgress,
        "closed" | "done" | "complete" => Status::Done,
        "blocked" => Status::Blocked,
        _ => Status::Pending,
    }
}

/// Map bd's numeric priority, defaulting everything unexpected to Medium.
pub fn map_priority(raw: i64) -> Priority {
    match raw {
        1 => Priority::High,
        2 => Priority::Medium,
        3 => Priority::Low,
        _ => Priority::Medium,
    }
}

/// Extract "Done when:" bullets from an issue description. The section is
/// opened by the header line and closed by the first blank line after it.
pub fn parse_done_when(description: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut in_section = false;

    for line in description.lines() {
        let line = line.trim();

        if line.to_lowercase().starts_with("done when:") {
            in_section = true;
            continue;
        }

        if in_section {
            if line.is_empty() {
                break;
            }
            if line.starts_with("- ") || line.starts_with("* ") {
                let item = line.strip_prefix("- ").unwrap_or(line);
                let item = item.strip_prefix("* ").unwrap_or(item);
                items.push(item.to_string());
            }
        }
    }

    items
}

/// Parse `bd list --json` / `bd show --json` output. Zero bytes means zero
/// issues, not a malformed document.
pub fn parse_issue_list(data: &[u8]) -> Result<Vec<RawIssue>, serde_json::Error> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(data)
}

/// Parse `bd blocked --json` output with the same empty-input rule.
pub fn parse_blocked_list(data: &[u8]) -> Result<Vec<RawBlockedIssue>, serde_json::Error> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(data)
}

/// Pull the version number out of a banner like "bd version 0.29.0 (dev)".
/// Falls back to the trimmed output when the banner shape changes.
pub fn parse_version(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data);
    let text = text.trim();

    let parts: Vec<&str> = text.split_whitespace().collect();
    for pair in parts.windows(2) {
        if pair[0] == "version" {
            return pair[1].to_string();
        }
    }

    text.to_string()
}
