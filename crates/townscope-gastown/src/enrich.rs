// ABOUTME: Per-agent liveness enrichment from tmux sessions and side files.
// ABOUTME: Status is inferred, never stored; every read here tolerates absence.

use crate::scan::agent_work_dir;
use crate::types::{Agent, AgentStatus};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use townscope_exec::Executor;

/// An agent with a live session but no activity past this is stuck.
pub const STUCK_AFTER: Duration = Duration::from_secs(10 * 60);

/// An agent with a live session, no hooked work, and no activity past
/// this is idle.
pub const IDLE_AFTER: Duration = Duration::from_secs(2 * 60);

#[derive(Debug, Default, Deserialize)]
struct SeanceFile {
    #[serde(default)]
    compaction: i64,
    #[serde(default)]
    molecule: String,
}

#[derive(Debug, Default, Deserialize)]
struct HookFile {
    #[serde(default)]
    molecule: String,
    #[serde(default)]
    attached: bool,
}

#[derive(Debug, Default, Deserialize)]
struct MoleculeRef {
    #[serde(default)]
    id: String,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Option<T> {
    let data = fs::read(path).ok()?;
    serde_json::from_slice(&data).ok()
}

/// Classify an agent from observable signals alone.
///
/// No session means offline. A missing or future mtime never marks an
/// agent stale; it reads as current activity.
pub fn infer_status(
    session_present: bool,
    elapsed: Option<Duration>,
    hook_attached: bool,
) -> AgentStatus {
    if !session_present {
        return AgentStatus::Offline;
    }
    match elapsed {
        Some(idle) if idle > STUCK_AFTER => AgentStatus::Stuck,
        Some(idle) if idle > IDLE_AFTER && !hook_attached => AgentStatus::Idle,
        _ => AgentStatus::Active,
    }
}

/// Session names currently live in tmux. A missing or failing tmux means
/// no sessions, which downstream reads as every agent offline.
pub(crate) async fn live_sessions(tmux: &dyn Executor) -> HashSet<String> {
    match tmux
        .run(None, &["list-sessions", "-F", "#{session_name}"])
        .await
    {
        Ok(output) => String::from_utf8_lossy(&output)
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect(),
        Err(err) => {
            tracing::debug!(error = %err, "tmux session listing unavailable");
            HashSet::new()
        }
    }
}

/// Fill in session, molecule, hook, activity, and inferred status for one
/// agent. Later sources win: hook state overrides the seance molecule, and
/// a molecule pinned in `.beads/molecule.json` overrides both.
pub(crate) fn enrich_agent(agent: &mut Agent, root: &Path, sessions: &HashSet<String>) {
    let work_dir = agent_work_dir(root, agent);
    agent.session = agent.session_name();
    let session_present = sessions.contains(&agent.session);

    if let Some(seance) = read_json::<SeanceFile>(&work_dir.join(".claude").join("seance.json")) {
        agent.compaction = seance.compaction;
        if !seance.molecule.is_empty() {
            agent.molecule = seance.molecule;
        }
    }

    if let Some(hook) = read_json::<HookFile>(&work_dir.join(".claude").join("hook.json")) {
        agent.hook_attached = hook.attached || !hook.molecule.is_empty();
        if !hook.molecule.is_empty() {
            agent.molecule = hook.molecule;
        }
    }

    if let Some(pinned) = read_json::<MoleculeRef>(&work_dir.join(".beads").join("molecule.json")) {
        if !pinned.id.is_empty() {
            agent.molecule = pinned.id;
            agent.hook_attached = true;
        }
    }

    let mut elapsed = None;
    if let Ok(meta) = fs::metadata(&work_dir) {
        if let Ok(modified) = meta.modified() {
            agent.last_active = Some(DateTime::<Utc>::from(modified));
            elapsed = modified.elapsed().ok();
        }
    }

    agent.status = infer_status(session_present, elapsed, agent.hook_attached);
    agent.work_dir = Some(work_dir);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use tempfile::TempDir;
    use townscope_exec::MockExecutor;

    #[test]
    fn test_infer_status_table() {
        let min = |m: u64| Some(Duration::from_secs(m * 60));
        let cases = [
            (false, min(0), true, AgentStatus::Offline),
            (false, None, false, AgentStatus::Offline),
            (true, None, false, AgentStatus::Active),
            (true, min(1), false, AgentStatus::Active),
            (true, min(3), false, AgentStatus::Idle),
            (true, min(3), true, AgentStatus::Active),
            (true, min(11), false, AgentStatus::Stuck),
            (true, min(11), true, AgentStatus::Stuck),
        ];
        for (present, elapsed, hooked, want) in cases {
            assert_eq!(
                infer_status(present, elapsed, hooked),
                want,
                "present={present} elapsed={elapsed:?} hooked={hooked}"
            );
        }
    }

    #[tokio::test]
    async fn test_live_sessions_parses_lines() {
        let mut tmux = MockExecutor::new();
        tmux.respond(
            "list-sessions -F #{session_name}",
            "gt-mayor\ngt-oak-witness\n\n",
        );

        let sessions = live_sessions(&tmux).await;
        assert_eq!(sessions.len(), 2);
        assert!(sessions.contains("gt-mayor"));
        assert!(sessions.contains("gt-oak-witness"));
    }

    #[tokio::test]
    async fn test_live_sessions_empty_on_failure() {
        let tmux = MockExecutor::new();
        assert!(live_sessions(&tmux).await.is_empty());
    }

    #[test]
    fn test_enrich_agent_reads_side_files() {
        let tmp = TempDir::new().unwrap();
        let work_dir = tmp.path().join("oak").join("polecats").join("nux");
        std::fs::create_dir_all(work_dir.join(".claude")).unwrap();
        std::fs::write(
            work_dir.join(".claude").join("seance.json"),
            r#"{"compaction": 2, "molecule": "mol-seance"}"#,
        )
        .unwrap();

        let mut sessions = HashSet::new();
        sessions.insert("gt-oak-nux".to_string());

        let mut agent = Agent::new(Role::Polecat, "nux", Some("oak".to_string()));
        enrich_agent(&mut agent, tmp.path(), &sessions);

        assert_eq!(agent.session, "gt-oak-nux");
        assert_eq!(agent.compaction, 2);
        assert_eq!(agent.molecule, "mol-seance");
        assert!(!agent.hook_attached);
        assert_eq!(agent.status, AgentStatus::Active);
        assert!(agent.last_active.is_some());
        assert_eq!(agent.work_dir.as_deref(), Some(work_dir.as_path()));
    }

    #[test]
    fn test_enrich_agent_molecule_precedence() {
        let tmp = TempDir::new().unwrap();
        let work_dir = tmp.path().join("oak").join("polecats").join("nux");
        std::fs::create_dir_all(work_dir.join(".claude")).unwrap();
        std::fs::create_dir_all(work_dir.join(".beads")).unwrap();
        std::fs::write(
            work_dir.join(".claude").join("seance.json"),
            r#"{"compaction": 1, "molecule": "mol-seance"}"#,
        )
        .unwrap();
        std::fs::write(
            work_dir.join(".claude").join("hook.json"),
            r#"{"molecule": "mol-hook", "attached": false}"#,
        )
        .unwrap();
        std::fs::write(
            work_dir.join(".beads").join("molecule.json"),
            r#"{"id": "mol-pinned", "title": "Pinned work"}"#,
        )
        .unwrap();

        let mut sessions = HashSet::new();
        sessions.insert("gt-oak-nux".to_string());

        let mut agent = Agent::new(Role::Polecat, "nux", Some("oak".to_string()));
        enrich_agent(&mut agent, tmp.path(), &sessions);

        assert_eq!(agent.molecule, "mol-pinned");
        assert!(agent.hook_attached);
    }

    #[test]
    fn test_enrich_agent_hook_molecule_implies_attached() {
        let tmp = TempDir::new().unwrap();
        let work_dir = tmp.path().join("oak").join("polecats").join("nux");
        std::fs::create_dir_all(work_dir.join(".claude")).unwrap();
        std::fs::write(
            work_dir.join(".claude").join("hook.json"),
            r#"{"molecule": "mol-hook"}"#,
        )
        .unwrap();

        let mut agent = Agent::new(Role::Polecat, "nux", Some("oak".to_string()));
        enrich_agent(&mut agent, tmp.path(), &HashSet::new());

        assert_eq!(agent.molecule, "mol-hook");
        assert!(agent.hook_attached);
        assert_eq!(agent.status, AgentStatus::Offline);
    }

    #[test]
    fn test_enrich_agent_missing_work_dir() {
        let tmp = TempDir::new().unwrap();
        let mut agent = Agent::new(Role::Witness, "witness", Some("ghost".to_string()));

        let mut sessions = HashSet::new();
        sessions.insert("gt-ghost-witness".to_string());
        enrich_agent(&mut agent, tmp.path(), &sessions);

        assert!(agent.last_active.is_none());
        assert_eq!(agent.status, AgentStatus::Active);
    }
}
