// ABOUTME: Convoy tracking state parsed from gt convoy list output.
// ABOUTME: Tolerates list or single-object payloads and fills derived counts.

use crate::types::WorkStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A batch of tracked issues moving through the town together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Convoy {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: WorkStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig: Option<String>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub completed: i64,
    #[serde(default)]
    pub blocked: i64,
    #[serde(default)]
    pub in_progress: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subscribers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConvoy {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    priority: String,
    #[serde(default)]
    rig: String,
    #[serde(default)]
    issues: Vec<String>,
    #[serde(default)]
    progress: i64,
    #[serde(default)]
    total: i64,
    #[serde(default)]
    completed: i64,
    #[serde(default)]
    blocked: i64,
    #[serde(default)]
    in_progress: i64,
    #[serde(default)]
    created_at: String,
    #[serde(default)]
    updated_at: String,
    #[serde(default)]
    subscribers: Vec<String>,
    #[serde(default)]
    agents: Vec<String>,
}

// gt emits RFC 3339; anything else reads as no timestamp.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

impl RawConvoy {
    fn into_convoy(self) -> Convoy {
        let mut convoy = Convoy {
            created_at: parse_timestamp(&self.created_at),
            updated_at: parse_timestamp(&self.updated_at),
            id: self.id,
            title: self.title,
            status: WorkStatus::parse(&self.status),
            priority: self.priority,
            rig: if self.rig.is_empty() {
                None
            } else {
                Some(self.rig)
            },
            issues: self.issues,
            progress: self.progress,
            total: self.total,
            completed: self.completed,
            blocked: self.blocked,
            in_progress: self.in_progress,
            subscribers: self.subscribers,
            agents: self.agents,
        };

        // Older gt builds omit the counters; recover what the issue list
        // and completion count imply.
        if convoy.total == 0 && !convoy.issues.is_empty() {
            convoy.total = convoy.issues.len() as i64;
        }
        if convoy.total > 0 && convoy.progress == 0 {
            convoy.progress = convoy.completed * 100 / convoy.total;
        }

        convoy
    }
}

/// Decode `gt convoy list --json` output. The payload may be a list or a
/// bare object; anything undecodable yields no convoys.
pub fn parse_convoy_list(data: &[u8]) -> Vec<Convoy> {
    if data.iter().all(|b| b.is_ascii_whitespace()) {
        return Vec::new();
    }

    if let Ok(raw) = serde_json::from_slice::<Vec<RawConvoy>>(data) {
        return raw.into_iter().map(RawConvoy::into_convoy).collect();
    }

    match serde_json::from_slice::<RawConvoy>(data) {
        Ok(raw) => vec![raw.into_convoy()],
        Err(err) => {
            tracing::debug!(error = %err, "unparseable convoy listing");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convoy_list() {
        let data = br#"[
            {
                "id": "convoy-1",
                "title": "Release train",
                "status": "in_progress",
                "priority": "high",
                "rig": "oak",
                "issues": ["bd-1", "bd-2"],
                "progress": 50,
                "total": 2,
                "completed": 1,
                "created_at": "2025-06-01T10:00:00Z",
                "agents": ["nux"]
            },
            {"id": "convoy-2", "title": "Cleanup", "status": "pending", "issues": []}
        ]"#;

        let convoys = parse_convoy_list(data);
        assert_eq!(convoys.len(), 2);
        assert_eq!(convoys[0].id, "convoy-1");
        assert_eq!(convoys[0].status, WorkStatus::InProgress);
        assert_eq!(convoys[0].priority, "high");
        assert_eq!(convoys[0].rig.as_deref(), Some("oak"));
        assert_eq!(convoys[0].progress, 50);
        assert!(convoys[0].created_at.is_some());
        assert_eq!(convoys[0].agents, vec!["nux"]);
        assert_eq!(convoys[1].status, WorkStatus::Pending);
        assert!(convoys[1].rig.is_none());
    }

    #[test]
    fn test_parse_single_convoy_object() {
        let data = br#"{"id": "convoy-9", "title": "Solo", "status": "blocked"}"#;
        let convoys = parse_convoy_list(data);
        assert_eq!(convoys.len(), 1);
        assert_eq!(convoys[0].id, "convoy-9");
        assert_eq!(convoys[0].status, WorkStatus::Blocked);
    }

    #[test]
    fn test_parse_rejects_garbage_quietly() {
        assert!(parse_convoy_list(b"").is_empty());
        assert!(parse_convoy_list(b"  \n").is_empty());
        assert!(parse_convoy_list(b"convoy list is empty").is_empty());
    }

    #[test]
    fn test_total_derived_from_issues() {
        let data = br#"{"id": "c", "issues": ["a", "b", "c"]}"#;
        let convoys = parse_convoy_list(data);
        assert_eq!(convoys[0].total, 3);
        assert_eq!(convoys[0].progress, 0);
    }

    #[test]
    fn test_progress_derived_from_completed() {
        let data = br#"{"id": "c", "total": 10, "completed": 3, "progress": 0}"#;
        let convoys = parse_convoy_list(data);
        assert_eq!(convoys[0].progress, 30);

        let explicit = parse_convoy_list(br#"{"id": "c", "total": 10, "completed": 3, "progress": 7}"#);
        assert_eq!(explicit[0].progress, 7);
    }

    #[test]
    fn test_bad_timestamp_tolerated() {
        let data = br#"{"id": "c", "created_at": "last tuesday", "updated_at": ""}"#;
        let convoys = parse_convoy_list(data);
        assert_eq!(convoys.len(), 1);
        assert!(convoys[0].created_at.is_none());
        assert!(convoys[0].updated_at.is_none());
    }
}
