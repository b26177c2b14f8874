// ABOUTME: Directory-presence topology scan over the town tree.
// ABOUTME: The layout conventions here must match gt's on-disk schema exactly.

use crate::types::{Agent, Role, TownConfig};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A town exists where a `mayor/` directory does.
pub fn town_exists(root: &Path) -> bool {
    root.join("mayor").is_dir()
}

/// Default per-user town root, `~/gt`.
pub fn default_town_root() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join("gt"))
        .unwrap_or_else(|| PathBuf::from("gt"))
}

/// Optional town metadata from `mayor/town.json`. Missing or malformed
/// files mean no metadata, never an error.
pub fn read_town_config(root: &Path) -> Option<TownConfig> {
    let data = fs::read(root.join("mayor").join("town.json")).ok()?;
    serde_json::from_slice(&data).ok()
}

/// Names of rig directories under the town root, sorted.
///
/// A rig is any direct subdirectory that is not `mayor`, not dot-prefixed,
/// and carries at least one rig marker (`polecats/`, `witness/` or `.beads/`).
pub fn rig_dirs(root: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        if name == "mayor" || name == ".beads" || name == ".git" || name.starts_with('.') {
            continue;
        }

        if !path.join("polecats").is_dir()
            && !path.join("witness").is_dir()
            && !path.join(".beads").is_dir()
        {
            continue;
        }

        names.push(name.to_string());
    }

    names.sort();
    Ok(names)
}

/// Agent directory names directly under `dir`, sorted, dotfiles skipped.
/// An unreadable directory holds no agents.
pub fn agent_dirs(dir: &Path) -> Vec<String> {
    let mut names = Vec::new();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return names,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n,
            None => continue,
        };
        if name.starts_with('.') {
            continue;
        }
        names.push(name.to_string());
    }

    names.sort();
    names
}

/// Where an agent runs, per the orchestrator's layout. The deacon shares
/// the mayor's directory.
pub fn agent_work_dir(root: &Path, agent: &Agent) -> PathBuf {
    let rig = agent.rig.as_deref().unwrap_or_default();
    match agent.role {
        Role::Mayor | Role::Deacon => root.join("mayor"),
        Role::Witness => root.join(rig).join("witness"),
        Role::Refinery => root.join(rig).join("refinery"),
        Role::Polecat => root.join(rig).join("polecats").join(&agent.name),
        Role::Crew => root.join(rig).join("crew").join(&agent.name),
    }
}
