// ABOUTME: Core town entities: roles, agents, rigs, and health summaries.
// ABOUTME: Address and session-name derivations live on Agent.

use crate::convoy::Convoy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Kind of agent in the town hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mayor,
    Deacon,
    Witness,
    Refinery,
    Crew,
    Polecat,
}

/// Inferred liveness of an agent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Active,
    Idle,
    Stuck,
    Offline,
    #[default]
    Unknown,
}

/// Shared progress states for convoys and molecules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkStatus {
    #[default]
    Pending,
    InProgress,
    Complete,
    Blocked,
    Failed,
}

impl WorkStatus {
    /// Map the raw status string from gt output. Unrecognized values fall
    /// back to Pending.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "in_progress" => WorkStatus::InProgress,
            "complete" | "completed" => WorkStatus::Complete,
            "blocked" => WorkStatus::Blocked,
            "failed" => WorkStatus::Failed,
            _ => WorkStatus::Pending,
        }
    }
}

/// One agent discovered in the town, enriched with liveness facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub role: Role,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig: Option<String>,
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub session: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub molecule: String,
    #[serde(default)]
    pub hook_attached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    pub compaction: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

impl Agent {
    pub fn new(role: Role, name: impl Into<String>, rig: Option<String>) -> Self {
        Agent {
            role,
            name: name.into(),
            rig,
            status: AgentStatus::Unknown,
            session: String::new(),
            molecule: String::new(),
            hook_attached: false,
            last_active: None,
            compaction: 0,
            work_dir: None,
        }
    }

    /// Mail-style address for this agent.
    pub fn address(&self) -> String {
        let rig = self.rig.as_deref().unwrap_or_default();
        match self.role {
            Role::Mayor => "mayor/".to_string(),
            Role::Deacon => "deacon/".to_string(),
            Role::Witness => format!("{rig}/witness"),
            Role::Refinery => format!("{rig}/refinery"),
            Role::Crew | Role::Polecat => format!("{}/{}", rig, self.name),
        }
    }

    /// The tmux session name the orchestrator uses for this agent. Must
    /// match gt's naming byte for byte or presence detection breaks.
    pub fn session_name(&self) -> String {
        let rig = self.rig.as_deref().unwrap_or_default();
        match self.role {
            Role::Mayor => "gt-mayor".to_string(),
            Role::Deacon => "gt-deacon".to_string(),
            Role::Witness => format!("gt-{rig}-witness"),
            Role::Refinery => format!("gt-{rig}-refinery"),
            Role::Polecat => format!("gt-{}-{}", rig, self.name),
            Role::Crew => format!("gt-{}-crew-{}", rig, self.name),
        }
    }
}

/// The whole workspace snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Town {
    pub root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub rigs: Vec<Rig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mayor: Option<Agent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deacon: Option<Agent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub convoys: Vec<Convoy>,
}

/// Contents of `mayor/town.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TownConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rigs: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// One project container and its agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rig {
    pub name: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witness: Option<Agent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refinery: Option<Agent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub polecats: Vec<Agent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub crew: Vec<Agent>,
}

/// Health roll-up for the whole town. Failure is reported inside the
/// value, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TownStatus {
    pub healthy: bool,
    pub town_root: PathBuf,
    pub active_agents: usize,
    pub total_agents: usize,
    pub active_rigs: usize,
    pub open_convoys: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One mail message between agents, as gt reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub priority: String,
    #[serde(default, rename = "type")]
    pub kind: String,
}
