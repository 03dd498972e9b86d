//! Flow graph implementation using petgraph.
//!
//! The graph is built once from a [`FlowDocument`] and never mutated
//! afterwards, so it can be shared behind an `Arc` by every session.
//! Validation happens entirely at construction:
//!
//! - node ids are unique
//! - every non-terminal node has a fallback target
//! - every pattern compiles
//! - every transition target exists
//! - the start node exists

use crate::document::{FlowDocument, NodeDefinition};
use crate::edge::Edge;
use crate::error::{ConfigError, GraphError};
use crate::node::Node;
use dialogue_agent_core::NodeId;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// The validated, immutable conversation graph.
#[derive(Debug, Clone)]
pub struct NodeGraph {
    /// Directed graph of node ids; edge weights record which transition they came from.
    graph: DiGraph<NodeId, Edge>,
    /// Map from node id to its petgraph index.
    index: HashMap<NodeId, NodeIndex>,
    /// Node bodies keyed by id.
    nodes: HashMap<NodeId, Node>,
    /// Where new sessions begin.
    start: NodeId,
}

impl NodeGraph {
    /// Builds a graph from a parsed flow document.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found, checking nodes in declaration order.
    pub fn from_document(
        document: FlowDocument,
        start: impl Into<NodeId>,
    ) -> Result<Self, ConfigError> {
        Self::from_definitions(document.conversation_tree, start)
    }

    /// Builds a graph from node definitions.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found, checking nodes in declaration order.
    pub fn from_definitions(
        definitions: Vec<NodeDefinition>,
        start: impl Into<NodeId>,
    ) -> Result<Self, ConfigError> {
        let start = start.into();
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        let mut nodes = HashMap::new();

        for definition in definitions {
            if index.contains_key(&definition.id) {
                return Err(ConfigError::DuplicateNode {
                    node_id: definition.id,
                });
            }
            let node = Node::compile(definition)?;
            let node_index = graph.add_node(node.id.clone());
            index.insert(node.id.clone(), node_index);
            nodes.insert(node.id.clone(), node);
        }

        // Edges are added only once every id is known, so forward references work.
        let declared: Vec<NodeIndex> = graph.node_indices().collect();
        for source_index in declared {
            let node = &nodes[&graph[source_index]];
            for (position, transition) in node.transitions.iter().enumerate() {
                let target = lookup_index(&index, node, &transition.next_node_id)?;
                graph.add_edge(source_index, target, Edge::Expected { position });
            }
            if let Some(default) = &node.default_next_node_id {
                let target = lookup_index(&index, node, default)?;
                graph.add_edge(source_index, target, Edge::Default);
            }
        }

        if !index.contains_key(&start) {
            return Err(ConfigError::MissingStartNode { node_id: start });
        }

        let flow = Self {
            graph,
            index,
            nodes,
            start,
        };

        for unreachable in flow.unreachable_nodes() {
            warn!(node_id = %unreachable, "node is unreachable from the start node");
        }

        Ok(flow)
    }

    /// Returns the node with the given id, if any.
    #[must_use]
    pub fn get(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Returns the node with the given id.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::NodeNotFound` for an unknown id.
    pub fn lookup(&self, node_id: &str) -> Result<&Node, GraphError> {
        self.get(node_id).ok_or_else(|| GraphError::NodeNotFound {
            node_id: NodeId::new(node_id),
        })
    }

    /// Returns true if the graph contains the given id.
    #[must_use]
    pub fn contains(&self, node_id: &str) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Returns the id new sessions start at.
    #[must_use]
    pub fn start_node(&self) -> &NodeId {
        &self.start
    }

    /// Returns all nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph
            .node_indices()
            .filter_map(|idx| self.nodes.get(&self.graph[idx]))
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of transitions, fallbacks included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the nodes reachable in one step, with the edge that leads there.
    pub fn successors(&self, node_id: &str) -> Vec<(&Node, Edge)> {
        let Some(&idx) = self.index.get(node_id) else {
            return Vec::new();
        };

        let mut successors: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter_map(|edge| {
                let target = self.nodes.get(&self.graph[edge.target()])?;
                Some((target, *edge.weight()))
            })
            .collect();
        // petgraph yields edges newest-first; present them in declaration order.
        successors.reverse();
        successors
    }

    /// Returns the nodes marked `end_of_path`.
    pub fn terminal_nodes(&self) -> Vec<&Node> {
        self.nodes().filter(|n| n.is_terminal()).collect()
    }

    /// Returns ids of nodes no path from the start node reaches.
    pub fn unreachable_nodes(&self) -> Vec<&NodeId> {
        let mut reached = HashSet::new();
        if let Some(&start) = self.index.get(&self.start) {
            let mut dfs = Dfs::new(&self.graph, start);
            while let Some(idx) = dfs.next(&self.graph) {
                reached.insert(idx);
            }
        }

        self.graph
            .node_indices()
            .filter(|idx| !reached.contains(idx))
            .map(|idx| &self.graph[idx])
            .collect()
    }

    /// Returns `(node id, action name)` for every node with an action.
    pub fn actions(&self) -> impl Iterator<Item = (&NodeId, &str)> {
        self.nodes()
            .filter_map(|n| n.action.as_deref().map(|action| (&n.id, action)))
    }
}

fn lookup_index(
    index: &HashMap<NodeId, NodeIndex>,
    node: &Node,
    target: &NodeId,
) -> Result<NodeIndex, ConfigError> {
    index
        .get(target)
        .copied()
        .ok_or_else(|| ConfigError::DanglingTarget {
            node_id: node.id.clone(),
            target: target.clone(),
        })
}
