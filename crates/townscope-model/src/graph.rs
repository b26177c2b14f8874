// ABOUTME: Dependency graph projection of the issue set.
// ABOUTME: Nodes, typed directed edges, and insert-maintained stats.

use crate::issue::{Priority, Status};
use serde::{Deserialize, Serialize};

/// Kind of dependency an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Blocks,
    Parent,
}

/// One issue as it appears in the graph view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub title: String,
    pub status: Status,
    pub priority: Priority,
}

/// Directed dependency between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeType,
}

/// Aggregate counts reported alongside the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub max_depth: usize,
}

/// Dependency graph over the full issue set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub stats: GraphStats,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    pub fn add_node(&mut self, node: GraphNode) {
        self.nodes.push(node);
        self.stats.node_count += 1;
    }

    pub fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
        self.stats.edge_count += 1;
    }
}
