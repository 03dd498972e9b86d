//! Conversation flow graph for dialogue-agent.
//!
//! This crate provides the immutable node graph the dialogue engine walks:
//!
//! - **Flow Document**: the `conversation_tree` configuration format (YAML)
//! - **Node Model**: questions, ordered candidate transitions, fallbacks
//! - **Graph**: load-time validation plus structural queries over petgraph

pub mod document;
pub mod edge;
pub mod error;
pub mod graph;
pub mod node;

pub use document::{ExpectedResponse, FlowDocument, NodeDefinition, load_flow};
pub use edge::Edge;
pub use error::{ConfigError, GraphError};
pub use graph::NodeGraph;
pub use node::{Node, Transition};
