//! Edge types for the flow graph.
//!
//! Every transition a node declares becomes one edge: each entry of
//! `expected_responses` keeps its declaration position, and the fallback
//! gets its own edge kind.

use serde::{Deserialize, Serialize};

/// An edge from one node to a possible next node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Edge {
    /// Candidate transition at the given position in `expected_responses`.
    Expected { position: usize },
    /// The `default_next_node_id` fallback.
    Default,
}

impl Edge {
    /// Returns true if this is the fallback edge.
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}
