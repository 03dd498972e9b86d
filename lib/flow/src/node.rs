//! Runtime node types.
//!
//! Nodes are the validated form of [`NodeDefinition`]s: keywords are
//! normalized and patterns compiled once at load time so per-turn matching
//! never has to handle a bad expression.

use crate::document::{ExpectedResponse, NodeDefinition};
use crate::error::ConfigError;
use dialogue_agent_core::{Entities, NodeId};
use regex::{Regex, RegexBuilder};

/// A point in the conversation.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique node id.
    pub id: NodeId,
    /// Question template.
    pub question: String,
    /// Candidate transitions in priority order.
    pub transitions: Vec<Transition>,
    /// Fallback target.
    pub default_next_node_id: Option<NodeId>,
    /// Lookup action to run on arrival.
    pub action: Option<String>,
    /// Whether this node ends the conversation path.
    pub end_of_path: bool,
}

/// A compiled candidate transition.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Lowercased keywords.
    pub keywords: Vec<String>,
    /// Case-insensitive compiled patterns.
    pub patterns: Vec<Regex>,
    /// Target node.
    pub next_node_id: NodeId,
}

impl Node {
    /// Builds a runtime node from its definition, compiling patterns.
    ///
    /// Target existence is checked by the graph, not here.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` for a pattern that does not
    /// compile, or `ConfigError::MissingFallback` for a non-terminal node
    /// without a default target.
    pub fn compile(definition: NodeDefinition) -> Result<Self, ConfigError> {
        if !definition.end_of_path && definition.default_next_node_id.is_none() {
            return Err(ConfigError::MissingFallback {
                node_id: definition.id,
            });
        }

        let transitions = definition
            .expected_responses
            .iter()
            .map(|response| Transition::compile(&definition.id, response))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: definition.id,
            question: definition.question,
            transitions,
            default_next_node_id: definition.default_next_node_id,
            action: definition.action,
            end_of_path: definition.end_of_path,
        })
    }

    /// Returns true if the node ends the conversation path.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.end_of_path
    }

    /// Returns every node id this node can transition to.
    pub fn targets(&self) -> impl Iterator<Item = &NodeId> {
        self.transitions
            .iter()
            .map(|t| &t.next_node_id)
            .chain(self.default_next_node_id.iter())
    }
}

impl Transition {
    /// Compiles a document response for the node `node_id`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPattern` if any pattern fails to compile.
    pub fn compile(node_id: &NodeId, response: &ExpectedResponse) -> Result<Self, ConfigError> {
        let patterns = response
            .patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| ConfigError::InvalidPattern {
                        node_id: node_id.clone(),
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            keywords: response
                .keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            patterns,
            next_node_id: response.next_node_id.clone(),
        })
    }

    /// Returns true if any keyword occurs in `input` or any pattern matches it.
    #[must_use]
    pub fn matches_input(&self, input: &str) -> bool {
        let lowered = input.to_lowercase();
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
            || self.patterns.iter().any(|p| p.is_match(input))
    }

    /// Collects named capture groups from every pattern that matches `input`.
    ///
    /// Earlier patterns win when two patterns capture the same name.
    #[must_use]
    pub fn captures(&self, input: &str) -> Entities {
        let mut entities = Entities::new();
        for pattern in &self.patterns {
            let Some(caps) = pattern.captures(input) else {
                continue;
            };
            for name in pattern.capture_names().flatten() {
                if let Some(m) = caps.name(name) {
                    entities
                        .entry(name.to_string())
                        .or_insert_with(|| m.as_str().trim().to_string());
                }
            }
        }
        entities
    }

    /// Returns the source text of each pattern.
    pub fn pattern_sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}
