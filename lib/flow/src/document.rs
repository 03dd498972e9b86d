//! The flow configuration document.
//!
//! A flow is a YAML document with a single `conversation_tree` list:
//!
//! ```yaml
//! conversation_tree:
//!   - id: start
//!     question: "Hi! Are you after products, an order, or the weather?"
//!     expected_responses:
//!       - keywords: [weather]
//!         patterns: ['weather in (?P<location>\w+)']
//!         next_node_id: weather_report
//!     default_next_node_id: start
//!   - id: weather_report
//!     question: "{weather_data}"
//!     action: get_current_weather
//!     end_of_path: true
//! ```

use crate::error::ConfigError;
use crate::graph::NodeGraph;
use dialogue_agent_core::NodeId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// The top-level flow document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowDocument {
    /// Node definitions in declaration order.
    pub conversation_tree: Vec<NodeDefinition>,
}

/// A node as written in the flow document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Unique node id.
    pub id: NodeId,
    /// Question template rendered when the conversation arrives here.
    pub question: String,
    /// Candidate transitions, highest priority first.
    #[serde(default)]
    pub expected_responses: Vec<ExpectedResponse>,
    /// Fallback when no candidate matches.
    #[serde(default)]
    pub default_next_node_id: Option<NodeId>,
    /// Lookup action to run on arrival.
    #[serde(default)]
    pub action: Option<String>,
    /// Whether this node ends the conversation path.
    #[serde(default)]
    pub end_of_path: bool,
}

/// One candidate transition as written in the flow document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedResponse {
    /// Words that signal this intent.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Regular expressions that signal this intent.
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Where the conversation goes when this candidate wins.
    pub next_node_id: NodeId,
}

impl NodeDefinition {
    /// Creates a definition with only an id and a question.
    #[must_use]
    pub fn new(id: impl Into<NodeId>, question: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            question: question.into(),
            expected_responses: Vec::new(),
            default_next_node_id: None,
            action: None,
            end_of_path: false,
        }
    }

    /// Appends a candidate transition.
    #[must_use]
    pub fn with_response(mut self, response: ExpectedResponse) -> Self {
        self.expected_responses.push(response);
        self
    }

    /// Sets the fallback target.
    #[must_use]
    pub fn with_default(mut self, target: impl Into<NodeId>) -> Self {
        self.default_next_node_id = Some(target.into());
        self
    }

    /// Sets the arrival action.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Marks the node as terminal.
    #[must_use]
    pub fn terminal(mut self) -> Self {
        self.end_of_path = true;
        self
    }
}

impl ExpectedResponse {
    /// Creates a candidate with no keywords or patterns.
    #[must_use]
    pub fn to(next_node_id: impl Into<NodeId>) -> Self {
        Self {
            keywords: Vec::new(),
            patterns: Vec::new(),
            next_node_id: next_node_id.into(),
        }
    }

    /// Adds a keyword.
    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keywords.push(keyword.into());
        self
    }

    /// Adds a pattern.
    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.patterns.push(pattern.into());
        self
    }
}

impl FlowDocument {
    /// Parses a flow document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseFailed` if the text is not a valid document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::ParseFailed {
            reason: e.to_string(),
        })
    }
}

/// Reads, parses, and validates the flow file at `path`.
///
/// # Errors
///
/// Returns a report wrapping the `ConfigError` that stopped the load. All
/// of these are fatal: the engine must not start on an invalid flow.
pub fn load_flow(
    path: &Path,
    start: impl Into<NodeId>,
) -> dialogue_agent_core::Result<NodeGraph, ConfigError> {
    debug!(path = %path.display(), "reading flow file");
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let document = FlowDocument::from_yaml_str(&text)?;
    let graph = NodeGraph::from_document(document, start)?;

    info!(
        path = %path.display(),
        nodes = graph.node_count(),
        start = %graph.start_node(),
        "flow loaded"
    );
    Ok(graph)
}
