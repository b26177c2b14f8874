// ABOUTME: Beads issue-tracker adapter for the town dashboard.
// ABOUTME: Shells out to the bd CLI and parses its JSON into domain types.

pub mod adapter;
pub mod error;
pub mod parser;

pub use adapter::{Adapter, CliAdapter};
pub use error::BeadsError;
