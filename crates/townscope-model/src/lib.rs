// ABOUTME: Domain types for the town dashboard's tracker views.
// ABOUTME: Issues, the kanban board, the dependency graph, and broadcast events.

pub mod board;
pub mod event;
pub mod graph;
pub mod issue;

pub use board::{Board, Column};
pub use event::{Event, EventType};
pub use graph::{EdgeType, Graph, GraphEdge, GraphNode, GraphStats};
pub use issue::{Issue, IssueFilter, IssueSummary, Priority, Status};
