// ABOUTME: Molecule workflow state read from per-agent .beads/molecule.json.
// ABOUTME: Progress is derived from step states, never trusted from the file.

use crate::types::WorkStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One step in a molecule workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoleculeStep {
    #[serde(default)]
    pub index: i64,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub needs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl MoleculeStep {
    /// Step statuses have no fixed vocabulary; several spellings mean done.
    pub fn is_done(&self) -> bool {
        matches!(self.status.as_str(), "complete" | "completed" | "done")
    }
}

/// A structured unit of work one agent is executing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Molecule {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: WorkStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub formula: String,
    #[serde(default)]
    pub current_step: i64,
    #[serde(default)]
    pub steps: Vec<MoleculeStep>,
    #[serde(default)]
    pub progress: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub agent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rig: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMolecule {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    formula: String,
    #[serde(default)]
    current_step: i64,
    #[serde(default)]
    steps: Vec<MoleculeStep>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

/// Read one molecule file. Missing, malformed, or id-less files are not
/// molecules; the caller moves on without noise.
pub fn load_molecule(path: &Path) -> Option<Molecule> {
    let data = fs::read(path).ok()?;
    let raw: RawMolecule = serde_json::from_slice(&data).ok()?;
    if raw.id.is_empty() {
        return None;
    }

    let total = raw.steps.len();
    let progress = raw.steps.iter().filter(|step| step.is_done()).count();

    Some(Molecule {
        id: raw.id,
        title: raw.title,
        status: WorkStatus::parse(&raw.status),
        formula: raw.formula,
        current_step: raw.current_step,
        steps: raw.steps,
        progress,
        total,
        agent: String::new(),
        rig: None,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_molecule(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("molecule.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_molecule_derives_progress() {
        let tmp = TempDir::new().unwrap();
        let path = write_molecule(
            &tmp,
            r#"{
                "id": "mol-1",
                "title": "Ship the feature",
                "status": "in_progress",
                "formula": "feature-dance",
                "current_step": 2,
                "steps": [
                    {"index": 0, "id": "design", "status": "complete"},
                    {"index": 1, "id": "build", "status": "done", "needs": ["design"]},
                    {"index": 2, "id": "review", "status": "in_progress"}
                ],
                "created_at": "2025-06-01T10:00:00Z"
            }"#,
        );

        let mol = load_molecule(&path).unwrap();
        assert_eq!(mol.id, "mol-1");
        assert_eq!(mol.status, WorkStatus::InProgress);
        assert_eq!(mol.formula, "feature-dance");
        assert_eq!(mol.current_step, 2);
        assert_eq!(mol.total, 3);
        assert_eq!(mol.progress, 2);
        assert_eq!(mol.steps[1].needs, vec!["design"]);
        assert!(mol.created_at.is_some());
        assert!(mol.updated_at.is_none());
        assert!(mol.agent.is_empty());
    }

    #[test]
    fn test_load_molecule_unknown_status_pending() {
        let tmp = TempDir::new().unwrap();
        let path = write_molecule(&tmp, r#"{"id": "mol-2", "status": "weird"}"#);

        let mol = load_molecule(&path).unwrap();
        assert_eq!(mol.status, WorkStatus::Pending);
        assert_eq!(mol.total, 0);
        assert_eq!(mol.progress, 0);
    }

    #[test]
    fn test_load_molecule_rejects_bad_files() {
        let tmp = TempDir::new().unwrap();

        assert!(load_molecule(&tmp.path().join("absent.json")).is_none());

        let garbage = write_molecule(&tmp, "{not json");
        assert!(load_molecule(&garbage).is_none());

        let empty_id = write_molecule(&tmp, r#"{"title": "no id here"}"#);
        assert!(load_molecule(&empty_id).is_none());

        let bad_time = write_molecule(&tmp, r#"{"id": "mol-3", "created_at": "yesterdayish"}"#);
        assert!(load_molecule(&bad_time).is_none());
    }

    #[test]
    fn test_step_is_done_spellings() {
        for status in ["complete", "completed", "done"] {
            let step = MoleculeStep {
                status: status.to_string(),
                ..MoleculeStep::default()
            };
            assert!(step.is_done(), "status {status:?}");
        }
        for status in ["in_progress", "pending", "Done", ""] {
            let step = MoleculeStep {
                status: status.to_string(),
                ..MoleculeStep::default()
            };
            assert!(!step.is_done(), "status {status:?}");
        }
    }
}
