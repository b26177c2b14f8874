// ABOUTME: Error taxonomy for town queries.
// ABOUTME: Lookup misses are typed; scan failures carry the io cause.

use std::path::PathBuf;
use thiserror::Error;

/// Why a town query failed.
#[derive(Debug, Error)]
pub enum GastownError {
    /// No `mayor/` directory under the configured root.
    #[error("town not found at {}", .root.display())]
    TownNotFound { root: PathBuf },

    /// The town root could not be read at all.
    #[error("failed to scan town root {}", .root.display())]
    Scan {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rig not found: {0}")]
    RigNotFound(String),

    #[error("convoy not found: {0}")]
    ConvoyNotFound(String),

    #[error("molecule not found: {0}")]
    MoleculeNotFound(String),
}
