//! Error types for the flow crate.
//!
//! - `ConfigError`: the flow document could not be turned into a valid graph.
//!   Always fatal; surfaced to the operator at startup.
//! - `GraphError`: lookups against an already validated graph.

use dialogue_agent_core::NodeId;
use std::fmt;

/// Errors raised while loading and validating a flow document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The flow file could not be read.
    ReadFailed { path: String, reason: String },
    /// The flow document is not valid YAML or has the wrong shape.
    ParseFailed { reason: String },
    /// Two nodes share the same id.
    DuplicateNode { node_id: NodeId },
    /// A transition points at a node that does not exist.
    DanglingTarget { node_id: NodeId, target: NodeId },
    /// A non-terminal node has no `default_next_node_id`.
    MissingFallback { node_id: NodeId },
    /// A response pattern is not a valid regular expression.
    InvalidPattern {
        node_id: NodeId,
        pattern: String,
        reason: String,
    },
    /// The configured start node is not part of the document.
    MissingStartNode { node_id: NodeId },
    /// A node names an action that no one registered.
    UnregisteredAction { node_id: NodeId, action: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { path, reason } => {
                write!(f, "failed to read flow file '{path}': {reason}")
            }
            Self::ParseFailed { reason } => {
                write!(f, "failed to parse flow document: {reason}")
            }
            Self::DuplicateNode { node_id } => {
                write!(f, "duplicate node id: {node_id}")
            }
            Self::DanglingTarget { node_id, target } => {
                write!(f, "node {node_id} transitions to unknown node {target}")
            }
            Self::MissingFallback { node_id } => {
                write!(
                    f,
                    "node {node_id} has neither default_next_node_id nor end_of_path"
                )
            }
            Self::InvalidPattern {
                node_id,
                pattern,
                reason,
            } => {
                write!(f, "invalid pattern '{pattern}' on node {node_id}: {reason}")
            }
            Self::MissingStartNode { node_id } => {
                write!(f, "start node not found: {node_id}")
            }
            Self::UnregisteredAction { node_id, action } => {
                write!(f, "node {node_id} uses unregistered action '{action}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors from graph lookups.
///
/// After validation these indicate a programming or configuration mismatch
/// (for example a session persisted against an older flow), never a normal
/// runtime condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Node with the given id was not found in the graph.
    NodeNotFound { node_id: NodeId },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => write!(f, "node not found: {node_id}"),
        }
    }
}

impl std::error::Error for GraphError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dangling_target_display() {
        let err = ConfigError::DanglingTarget {
            node_id: NodeId::new("start"),
            target: NodeId::new("nowhere"),
        };
        assert_eq!(
            err.to_string(),
            "node start transitions to unknown node nowhere"
        );
    }

    #[test]
    fn invalid_pattern_display() {
        let err = ConfigError::InvalidPattern {
            node_id: NodeId::new("ask_order_number"),
            pattern: "(".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert!(err.to_string().contains("invalid pattern '('"));
        assert!(err.to_string().contains("unclosed group"));
    }

    #[test]
    fn graph_error_display() {
        let err = GraphError::NodeNotFound {
            node_id: NodeId::new("ghost"),
        };
        assert!(err.to_string().contains("node not found"));
    }
}
