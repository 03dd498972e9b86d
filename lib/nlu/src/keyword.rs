//! Lexical intent classifier.
//!
//! Picks the first candidate whose keywords appear in the input or whose
//! patterns match it. Entities come from the named capture groups of the
//! winning candidate's patterns, so a flow can extract an order number with
//! `(?P<order_number>\d{9})` without any model in the loop.

use crate::classifier::{Classification, IntentClassifier};
use crate::error::ClassifierError;
use async_trait::async_trait;
use dialogue_agent_flow::Transition;
use tracing::trace;

/// Keyword and pattern based classifier. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// Creates a new keyword classifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Classifies synchronously; the async trait method delegates here.
    #[must_use]
    pub fn classify_input(&self, input: &str, candidates: &[Transition]) -> Classification {
        let Some(winner) = candidates.iter().find(|t| t.matches_input(input)) else {
            trace!("no candidate matched lexically");
            return Classification::no_match();
        };

        Classification {
            chosen_next_node_id: Some(winner.next_node_id.clone()),
            entities: winner.captures(input),
        }
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(
        &self,
        _question: &str,
        input: &str,
        candidates: &[Transition],
    ) -> Result<Classification, ClassifierError> {
        Ok(self.classify_input(input, candidates))
    }
}
