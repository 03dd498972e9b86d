//! Error types for the nlu crate.
//!
//! - `LlmError`: low-level LLM backend failures
//! - `ClassifierError`: the NLU collaborator could not produce a usable answer
//! - `ResolutionError`: a turn could not be resolved to a next node

use dialogue_agent_core::NodeId;
use std::fmt;

/// Errors from LLM backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Provider is unavailable.
    ProviderUnavailable { provider: String, reason: String },
    /// Request failed.
    RequestFailed { reason: String },
    /// Timeout waiting for response.
    Timeout,
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderUnavailable { provider, reason } => {
                write!(f, "LLM provider '{provider}' unavailable: {reason}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "LLM request failed: {reason}")
            }
            Self::Timeout => write!(f, "LLM request timed out"),
        }
    }
}

impl std::error::Error for LlmError {}

/// Errors from an intent classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifierError {
    /// The classifier could not be reached.
    Unavailable { reason: String },
    /// The classifier answered with something that could not be interpreted.
    MalformedOutput { reason: String },
}

impl fmt::Display for ClassifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "classifier unavailable: {reason}"),
            Self::MalformedOutput { reason } => {
                write!(f, "malformed classifier output: {reason}")
            }
        }
    }
}

impl std::error::Error for ClassifierError {}

impl From<LlmError> for ClassifierError {
    fn from(e: LlmError) -> Self {
        Self::Unavailable {
            reason: e.to_string(),
        }
    }
}

/// Errors from transition resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The classifier failed while resolving the given node.
    Classifier {
        node_id: NodeId,
        source: ClassifierError,
    },
    /// Terminal nodes have no transitions to resolve.
    TerminalNode { node_id: NodeId },
    /// Nothing matched and the node has no fallback target.
    NoFallback { node_id: NodeId },
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classifier { node_id, source } => {
                write!(f, "could not resolve transition from {node_id}: {source}")
            }
            Self::TerminalNode { node_id } => {
                write!(f, "node {node_id} is terminal and has no transitions")
            }
            Self::NoFallback { node_id } => {
                write!(f, "no candidate matched and node {node_id} has no fallback")
            }
        }
    }
}

impl std::error::Error for ResolutionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Classifier { source, .. } => Some(source),
            Self::TerminalNode { .. } | Self::NoFallback { .. } => None,
        }
    }
}
