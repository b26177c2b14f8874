// ABOUTME: Read-only adapter assembling town state for dashboard queries.
// ABOUTME: Composes the tree scan, tmux presence, and gt CLI output per call.

use crate::convoy::{parse_convoy_list, Convoy};
use crate::enrich::{enrich_agent, live_sessions};
use crate::error::GastownError;
use crate::molecule::{load_molecule, Molecule};
use crate::scan;
use crate::types::{Agent, AgentStatus, Message, Rig, Role, Town, TownStatus};
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use townscope_exec::{CliExecutor, Executor};

/// Read-only view over a Gas Town workspace.
///
/// Every call observes current state; nothing here caches or writes.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Health roll-up for the whole town. Never fails: trouble is reported
    /// inside the status value.
    async fn status(&self) -> Result<TownStatus, GastownError>;

    /// The full town snapshot.
    async fn town(&self) -> Result<Town, GastownError>;

    /// All rigs with their agents enriched.
    async fn rigs(&self) -> Result<Vec<Rig>, GastownError>;

    /// One rig by name.
    async fn rig(&self, name: &str) -> Result<Rig, GastownError>;

    /// Every agent in the town, town-level agents first.
    async fn agents(&self) -> Result<Vec<Agent>, GastownError>;

    /// Active convoys as gt reports them.
    async fn convoys(&self) -> Result<Vec<Convoy>, GastownError>;

    /// One convoy by id.
    async fn convoy(&self, id: &str) -> Result<Convoy, GastownError>;

    /// Molecules currently pinned by any agent, deduplicated by id.
    async fn molecules(&self) -> Result<Vec<Molecule>, GastownError>;

    /// One molecule by id.
    async fn molecule(&self, id: &str) -> Result<Molecule, GastownError>;

    /// Inbox for an agent address.
    async fn mail(&self, address: &str) -> Result<Vec<Message>, GastownError>;
}

/// Adapter backed by the town directory tree plus the gt and tmux CLIs.
pub struct FsAdapter {
    town_root: PathBuf,
    gt: Arc<dyn Executor>,
    tmux: Arc<dyn Executor>,
}

impl FsAdapter {
    /// Observe the town at `town_root`, defaulting to `~/gt`.
    pub fn new(town_root: Option<PathBuf>) -> Self {
        FsAdapter::with_executors(
            town_root,
            Arc::new(CliExecutor::new("gt")),
            Arc::new(CliExecutor::new("tmux")),
        )
    }

    /// Observe the town through caller-supplied executors.
    pub fn with_executors(
        town_root: Option<PathBuf>,
        gt: Arc<dyn Executor>,
        tmux: Arc<dyn Executor>,
    ) -> Self {
        FsAdapter {
            town_root: town_root.unwrap_or_else(scan::default_town_root),
            gt,
            tmux,
        }
    }

    pub fn town_root(&self) -> &Path {
        &self.town_root
    }

    /// The deacon leaves a pid file; when that is missing, ask gt itself.
    async fn daemon_running(&self) -> bool {
        if self.town_root.join("mayor").join("daemon.pid").exists() {
            return true;
        }
        self.gt
            .run(Some(&self.town_root), &["daemon", "status"])
            .await
            .is_ok()
    }

    fn scan_rigs(&self, sessions: &HashSet<String>) -> Result<Vec<Rig>, GastownError> {
        let names = scan::rig_dirs(&self.town_root).map_err(|source| GastownError::Scan {
            root: self.town_root.clone(),
            source,
        })?;

        Ok(names
            .iter()
            .map(|name| self.scan_rig(name, sessions))
            .collect())
    }

    fn scan_rig(&self, name: &str, sessions: &HashSet<String>) -> Rig {
        let path = self.town_root.join(name);
        let mut rig = Rig {
            name: name.to_string(),
            path: path.clone(),
            witness: None,
            refinery: None,
            polecats: Vec::new(),
            crew: Vec::new(),
        };

        if path.join("witness").is_dir() {
            let mut witness = Agent::new(Role::Witness, "witness", Some(name.to_string()));
            enrich_agent(&mut witness, &self.town_root, sessions);
            rig.witness = Some(witness);
        }

        if path.join("refinery").is_dir() {
            let mut refinery = Agent::new(Role::Refinery, "refinery", Some(name.to_string()));
            enrich_agent(&mut refinery, &self.town_root, sessions);
            rig.refinery = Some(refinery);
        }

        for polecat in scan::agent_dirs(&path.join("polecats")) {
            let mut agent = Agent::new(Role::Polecat, polecat, Some(name.to_string()));
            enrich_agent(&mut agent, &self.town_root, sessions);
            rig.polecats.push(agent);
        }

        for member in scan::agent_dirs(&path.join("crew")) {
            let mut agent = Agent::new(Role::Crew, member, Some(name.to_string()));
            enrich_agent(&mut agent, &self.town_root, sessions);
            rig.crew.push(agent);
        }

        rig
    }
}

#[async_trait]
impl Adapter for FsAdapter {
    async fn status(&self) -> Result<TownStatus, GastownError> {
        let mut status = TownStatus {
            healthy: false,
            town_root: self.town_root.clone(),
            active_agents: 0,
            total_agents: 0,
            active_rigs: 0,
            open_convoys: 0,
            error: None,
        };

        let town = match self.town().await {
            Ok(town) => town,
            Err(err) => {
                status.error = Some(err.to_string());
                return Ok(status);
            }
        };

        status.active_rigs = town.rigs.len();
        for rig in &town.rigs {
            for agent in rig
                .witness
                .iter()
                .chain(rig.refinery.iter())
                .chain(rig.polecats.iter())
                .chain(rig.crew.iter())
            {
                status.total_agents += 1;
                if agent.status == AgentStatus::Active {
                    status.active_agents += 1;
                }
            }
        }
        for agent in town.mayor.iter().chain(town.deacon.iter()) {
            status.total_agents += 1;
            if agent.status == AgentStatus::Active {
                status.active_agents += 1;
            }
        }

        status.open_convoys = town.convoys.len();
        status.healthy = true;

        Ok(status)
    }

    async fn town(&self) -> Result<Town, GastownError> {
        if !scan::town_exists(&self.town_root) {
            return Err(GastownError::TownNotFound {
                root: self.town_root.clone(),
            });
        }

        let mut town = Town {
            root: self.town_root.clone(),
            name: None,
            rigs: Vec::new(),
            mayor: None,
            deacon: None,
            convoys: Vec::new(),
        };

        if let Some(config) = scan::read_town_config(&self.town_root) {
            town.name = config.name.filter(|name| !name.is_empty());
        }

        // One tmux round-trip covers every agent scanned below.
        let sessions = live_sessions(self.tmux.as_ref()).await;

        if self.town_root.join("mayor").is_dir() {
            let mut mayor = Agent::new(Role::Mayor, "mayor", None);
            enrich_agent(&mut mayor, &self.town_root, &sessions);
            town.mayor = Some(mayor);
        }

        if self.daemon_running().await {
            let mut deacon = Agent::new(Role::Deacon, "deacon", None);
            enrich_agent(&mut deacon, &self.town_root, &sessions);
            town.deacon = Some(deacon);
        }

        match self.scan_rigs(&sessions) {
            Ok(rigs) => town.rigs = rigs,
            Err(err) => tracing::debug!(error = %err, "rig scan failed"),
        }

        if let Ok(convoys) = self.convoys().await {
            town.convoys = convoys;
        }

        Ok(town)
    }

    async fn rigs(&self) -> Result<Vec<Rig>, GastownError> {
        let sessions = live_sessions(self.tmux.as_ref()).await;
        self.scan_rigs(&sessions)
    }

    async fn rig(&self, name: &str) -> Result<Rig, GastownError> {
        self.rigs()
            .await?
            .into_iter()
            .find(|rig| rig.name == name)
            .ok_or_else(|| GastownError::RigNotFound(name.to_string()))
    }

    async fn agents(&self) -> Result<Vec<Agent>, GastownError> {
        let town = self.town().await?;

        let mut agents = Vec::new();
        agents.extend(town.mayor);
        agents.extend(town.deacon);
        for rig in town.rigs {
            agents.extend(rig.witness);
            agents.extend(rig.refinery);
            agents.extend(rig.polecats);
            agents.extend(rig.crew);
        }

        Ok(agents)
    }

    async fn convoys(&self) -> Result<Vec<Convoy>, GastownError> {
        let output = match self
            .gt
            .run(Some(&self.town_root), &["convoy", "list", "--json"])
            .await
        {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!(error = %err, "gt convoy listing unavailable");
                return Ok(Vec::new());
            }
        };

        Ok(parse_convoy_list(&output))
    }

    async fn convoy(&self, id: &str) -> Result<Convoy, GastownError> {
        self.convoys()
            .await?
            .into_iter()
            .find(|convoy| convoy.id == id)
            .ok_or_else(|| GastownError::ConvoyNotFound(id.to_string()))
    }

    async fn molecules(&self) -> Result<Vec<Molecule>, GastownError> {
        let agents = self.agents().await?;

        let mut seen = HashSet::new();
        let mut molecules = Vec::new();

        for agent in agents {
            let work_dir = match &agent.work_dir {
                Some(dir) => dir,
                None => continue,
            };

            let path = work_dir.join(".beads").join("molecule.json");
            let mut molecule = match load_molecule(&path) {
                Some(molecule) => molecule,
                None => continue,
            };

            // The same molecule can be pinned by several agents; the first
            // scanned agent claims it.
            if !seen.insert(molecule.id.clone()) {
                continue;
            }

            molecule.agent = agent.name;
            molecule.rig = agent.rig;
            molecules.push(molecule);
        }

        Ok(molecules)
    }

    async fn molecule(&self, id: &str) -> Result<Molecule, GastownError> {
        self.molecules()
            .await?
            .into_iter()
            .find(|molecule| molecule.id == id)
            .ok_or_else(|| GastownError::MoleculeNotFound(id.to_string()))
    }

    async fn mail(&self, address: &str) -> Result<Vec<Message>, GastownError> {
        let output = match self
            .gt
            .run_with_env(
                Some(&self.town_root),
                &["mail", "inbox", "--json"],
                &[("GT_ROLE", address)],
            )
            .await
        {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!(error = %err, address, "gt mail unavailable");
                return Ok(Vec::new());
            }
        };

        match serde_json::from_slice(&output) {
            Ok(messages) => Ok(messages),
            Err(err) => {
                tracing::debug!(error = %err, address, "unparseable mail listing");
                Ok(Vec::new())
            }
        }
    }
}
