// ABOUTME: Broadcast event vocabulary for the dashboard's live feed.
// ABOUTME: Typed payloads serialized into a uniform envelope.

use crate::issue::Status;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of live-feed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    IssueCreated,
    IssueUpdated,
    IssueDeleted,
    Heartbeat,
}

/// Envelope shared by every event on the feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "event")]
    pub kind: EventType,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueCreatedData {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueUpdatedData {
    pub id: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<Status>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDeletedData {
    pub id: String,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatData {
    pub timestamp: DateTime<Utc>,
}

impl Event {
    fn envelope(kind: EventType, data: impl Serialize, timestamp: DateTime<Utc>) -> Self {
        Event {
            kind,
            data: serde_json::to_value(data).unwrap_or(Value::Null),
            timestamp,
        }
    }

    pub fn heartbeat() -> Self {
        let now = Utc::now();
        Event::envelope(EventType::Heartbeat, HeartbeatData { timestamp: now }, now)
    }

    pub fn issue_created(id: &str, title: &str, status: Status) -> Self {
        let now = Utc::now();
        Event::envelope(
            EventType::IssueCreated,
            IssueCreatedData {
                id: id.to_string(),
                title: title.to_string(),
                status,
                created_at: now,
            },
            now,
        )
    }

    pub fn issue_updated(id: &str, status: Status, previous_status: Option<Status>) -> Self {
        let now = Utc::now();
        Event::envelope(
            EventType::IssueUpdated,
            IssueUpdatedData {
                id: id.to_string(),
                status,
                previous_status,
                updated_at: now,
            },
            now,
        )
    }

    pub fn issue_deleted(id: &str) -> Self {
        let now = Utc::now();
        Event::envelope(
            EventType::IssueDeleted,
            IssueDeletedData {
                id: id.to_string(),
                deleted_at: now,
            },
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heartbeat_envelope() {
        let event = Event::heartbeat();
        assert_eq!(event.kind, EventType::Heartbeat);

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], serde_json::json!("heartbeat"));
        assert!(value["data"]["timestamp"].is_string());
    }

    #[test]
    fn test_issue_updated_carries_transition() {
        let event = Event::issue_updated("tw-9", Status::Done, Some(Status::InProgress));
        assert_eq!(event.kind, EventType::IssueUpdated);
        assert_eq!(event.data["id"], serde_json::json!("tw-9"));
        assert_eq!(event.data["status"], serde_json::json!("done"));
        assert_eq!(event.data["previous_status"], serde_json::json!("in_progress"));
    }

    #[test]
    fn test_issue_updated_omits_unknown_previous() {
        let event = Event::issue_updated("tw-9", Status::Done, None);
        assert!(event.data.get("previous_status").is_none());
    }
}
