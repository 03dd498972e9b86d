//! The NLU collaborator contract.
//!
//! The engine never interprets free text itself. It hands the current
//! question, the raw input, and the node's candidate transitions to an
//! [`IntentClassifier`] and gets back the chosen target (if any) plus
//! whatever entities the classifier pulled out of the input.

use crate::error::ClassifierError;
use async_trait::async_trait;
use dialogue_agent_core::{Entities, NodeId};
use dialogue_agent_flow::Transition;
use serde::{Deserialize, Serialize};

/// A classifier's answer for one turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// The candidate target the classifier picked; `None` means no candidate fit.
    #[serde(default, rename = "next_node_id")]
    pub chosen_next_node_id: Option<NodeId>,
    /// Entities extracted from the input.
    #[serde(default)]
    pub entities: Entities,
}

impl Classification {
    /// A classification that picked nothing and extracted nothing.
    #[must_use]
    pub fn no_match() -> Self {
        Self::default()
    }

    /// A classification that picked the given target.
    #[must_use]
    pub fn chose(next_node_id: impl Into<NodeId>) -> Self {
        Self {
            chosen_next_node_id: Some(next_node_id.into()),
            entities: Entities::new(),
        }
    }

    /// Adds an extracted entity.
    #[must_use]
    pub fn with_entity(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entities.insert(name.into(), value.into());
        self
    }
}

/// Trait for intent classifiers.
///
/// Implementations may call out over the network; the engine imposes no
/// timeout of its own.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Classifies `input` given as an answer to `question`.
    ///
    /// # Errors
    ///
    /// Returns an error if the classifier is unreachable or its output
    /// cannot be interpreted.
    async fn classify(
        &self,
        question: &str,
        input: &str,
        candidates: &[Transition],
    ) -> Result<Classification, ClassifierError>;
}
