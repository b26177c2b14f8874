// ABOUTME: Gas Town workspace adapter for the town dashboard.
// ABOUTME: Scans the town tree, checks tmux presence, and reads gt CLI output.

pub mod adapter;
pub mod convoy;
pub mod enrich;
pub mod error;
pub mod molecule;
pub mod scan;
pub mod types;

pub use adapter::{Adapter, FsAdapter};
pub use convoy::Convoy;
pub use error::GastownError;
pub use molecule::{Molecule, MoleculeStep};
pub use types::{
    Agent, AgentStatus, Message, Rig, Role, Town, TownConfig, TownStatus, WorkStatus,
};
