//! Transition resolution.
//!
//! The resolver owns the routing policy; the classifier only supplies an
//! opinion. Candidates are evaluated strictly in declaration order:
//!
//! 1. the first candidate whose target is the one the classifier chose
//! 2. otherwise the first candidate that lexically matches the input
//! 3. otherwise the node's `default_next_node_id`
//!
//! Entities are passed through from the classifier untouched, including
//! when the fallback is taken.

use crate::classifier::IntentClassifier;
use crate::error::ResolutionError;
use dialogue_agent_core::{Entities, NodeId};
use dialogue_agent_flow::Node;
use tracing::{debug, instrument};

/// Which rule produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource {
    /// The classifier chose the candidate at this position.
    Classified { position: usize },
    /// The candidate at this position matched the input lexically.
    Lexical { position: usize },
    /// Nothing matched; the fallback was taken.
    Default,
}

/// The outcome of resolving one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Where the conversation goes next.
    pub next_node_id: NodeId,
    /// Entities extracted this turn.
    pub entities: Entities,
    /// Which rule picked the target.
    pub source: MatchSource,
}

/// Resolves user input to the next node using an intent classifier.
#[derive(Debug, Clone)]
pub struct TransitionResolver<C> {
    classifier: C,
}

impl<C: IntentClassifier> TransitionResolver<C> {
    /// Creates a resolver over the given classifier.
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    /// Returns the underlying classifier.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Resolves `input`, given at `node`, to the next node id.
    ///
    /// `session_entities` is what the session already knows; it is not
    /// consulted by the first-match policy.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::Classifier` when the classifier fails, and
    /// `TerminalNode`/`NoFallback` for nodes that cannot be resolved.
    #[instrument(skip(self, node, input, session_entities), fields(node_id = %node.id))]
    pub async fn resolve(
        &self,
        node: &Node,
        input: &str,
        session_entities: &Entities,
    ) -> Result<Resolution, ResolutionError> {
        if node.is_terminal() {
            return Err(ResolutionError::TerminalNode {
                node_id: node.id.clone(),
            });
        }

        let classification = self
            .classifier
            .classify(&node.question, input, &node.transitions)
            .await
            .map_err(|source| ResolutionError::Classifier {
                node_id: node.id.clone(),
                source,
            })?;

        let classified = classification.chosen_next_node_id.as_ref().and_then(|chosen| {
            node.transitions
                .iter()
                .position(|t| &t.next_node_id == chosen)
        });
        if classification.chosen_next_node_id.is_some() && classified.is_none() {
            debug!(
                chosen = ?classification.chosen_next_node_id,
                "classifier chose a target outside the candidates; ignoring it"
            );
        }

        let (next_node_id, source) = if let Some(position) = classified {
            (
                node.transitions[position].next_node_id.clone(),
                MatchSource::Classified { position },
            )
        } else if let Some(position) = node.transitions.iter().position(|t| t.matches_input(input))
        {
            (
                node.transitions[position].next_node_id.clone(),
                MatchSource::Lexical { position },
            )
        } else {
            let fallback =
                node.default_next_node_id
                    .clone()
                    .ok_or_else(|| ResolutionError::NoFallback {
                        node_id: node.id.clone(),
                    })?;
            (fallback, MatchSource::Default)
        };

        debug!(
            next_node_id = %next_node_id,
            source = ?source,
            extracted = classification.entities.len(),
            known = session_entities.len(),
            "transition resolved"
        );

        Ok(Resolution {
            next_node_id,
            entities: classification.entities,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::Classification;
    use crate::error::ClassifierError;
    use crate::keyword::KeywordClassifier;
    use async_trait::async_trait;
    use dialogue_agent_flow::{ExpectedResponse, NodeDefinition, Transition};

    /// Classifier that always returns the same answer.
    struct FixedClassifier(Result<Classification, ClassifierError>);

    #[async_trait]
    impl IntentClassifier for FixedClassifier {
        async fn classify(
            &self,
            _question: &str,
            _input: &str,
            _candidates: &[Transition],
        ) -> Result<Classification, ClassifierError> {
            self.0.clone()
        }
    }

    fn ask_product_type() -> Node {
        Node::compile(
            NodeDefinition::new("ask_product_type", "What type of product?")
                .with_response(ExpectedResponse::to("tell_electronics").keyword("electronics"))
                .with_response(ExpectedResponse::to("tell_clothing").keyword("clothing"))
                .with_default("ask_again"),
        )
        .expect("compile")
    }

    #[tokio::test]
    async fn classified_match_wins() {
        let resolver = TransitionResolver::new(FixedClassifier(Ok(Classification::chose(
            "tell_electronics",
        )
        .with_entity("product_type", "electronics"))));

        let resolution = resolver
            .resolve(&ask_product_type(), "laptops please", &Entities::new())
            .await
            .expect("resolve");

        assert_eq!(resolution.next_node_id.as_str(), "tell_electronics");
        assert_eq!(resolution.source, MatchSource::Classified { position: 0 });
        assert_eq!(
            resolution.entities.get("product_type").map(String::as_str),
            Some("electronics")
        );
    }

    #[tokio::test]
    async fn keyword_classifier_routes_electronics() {
        let resolver = TransitionResolver::new(KeywordClassifier::new());
        let node = ask_product_type();

        let hit = resolver
            .resolve(&node, "I want electronics", &Entities::new())
            .await
            .expect("resolve");
        assert_eq!(hit.next_node_id.as_str(), "tell_electronics");

        let miss = resolver
            .resolve(&node, "something for the garden", &Entities::new())
            .await
            .expect("resolve");
        assert_eq!(miss.next_node_id.as_str(), "ask_again");
        assert_eq!(miss.source, MatchSource::Default);
    }

    #[tokio::test]
    async fn unknown_choice_falls_back_to_lexical() {
        let resolver =
            TransitionResolver::new(FixedClassifier(Ok(Classification::chose("somewhere_else"))));
        let resolution = resolver
            .resolve(&ask_product_type(), "clothing", &Entities::new())
            .await
            .expect("resolve");
        assert_eq!(resolution.next_node_id.as_str(), "tell_clothing");
        assert_eq!(resolution.source, MatchSource::Lexical { position: 1 });
    }

    #[tokio::test]
    async fn default_keeps_unconditional_entities() {
        let resolver = TransitionResolver::new(FixedClassifier(Ok(
            Classification::no_match().with_entity("mood", "curious")
        )));
        let resolution = resolver
            .resolve(&ask_product_type(), "just browsing", &Entities::new())
            .await
            .expect("resolve");
        assert_eq!(resolution.next_node_id.as_str(), "ask_again");
        assert_eq!(resolution.entities.get("mood").map(String::as_str), Some("curious"));
    }

    #[tokio::test]
    async fn classifier_failure_is_resolution_error() {
        let resolver = TransitionResolver::new(FixedClassifier(Err(
            ClassifierError::Unavailable {
                reason: "connection refused".to_string(),
            },
        )));
        let err = resolver
            .resolve(&ask_product_type(), "electronics", &Entities::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ResolutionError::Classifier { .. }));
    }

    #[tokio::test]
    async fn terminal_nodes_are_not_resolved() {
        let node = Node::compile(NodeDefinition::new("goodbye", "Bye").terminal()).expect("compile");
        let resolver = TransitionResolver::new(KeywordClassifier::new());
        let err = resolver
            .resolve(&node, "anything", &Entities::new())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ResolutionError::TerminalNode {
                node_id: NodeId::new("goodbye")
            }
        );
    }
}
