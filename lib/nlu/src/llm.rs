//! LLM-backed intent classifier.
//!
//! Builds a routing prompt from the current question, the user's reply and
//! the node's candidate transitions, asks the backend for a JSON answer of
//! the shape `{"next_node_id": string | null, "entities": {..}}`, and
//! parses it into a [`Classification`].

use crate::backend::{LlmBackend, LlmRequest};
use crate::classifier::{Classification, IntentClassifier};
use crate::error::ClassifierError;
use async_trait::async_trait;
use dialogue_agent_core::{Entities, NodeId};
use dialogue_agent_flow::Transition;
use serde_json::Value as JsonValue;
use std::fmt::Write as _;
use tracing::debug;

const SYSTEM_PROMPT: &str = "\
You route a guided conversation. You are given the question that was asked, \
the user's reply, and the possible next steps. Pick the next step whose \
keywords or patterns best fit the reply, or null if none fits. Extract any \
entities the next step will need (such as product_type, order_number or \
location) from the reply. Answer with JSON only.";

/// Classifier that delegates routing to an LLM.
#[derive(Debug, Clone)]
pub struct LlmClassifier<B: LlmBackend> {
    backend: B,
    temperature: f32,
}

impl<B: LlmBackend> LlmClassifier<B> {
    /// Creates a classifier over the given backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            temperature: 0.0,
        }
    }

    /// Sets the sampling temperature used for routing requests.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Builds the routing request for one turn.
    #[must_use]
    pub fn build_request(
        &self,
        question: &str,
        input: &str,
        candidates: &[Transition],
    ) -> LlmRequest {
        let mut prompt =
            format!("Current question: \"{question}\"\nUser's response: \"{input}\"\n");

        if candidates.is_empty() {
            prompt.push_str("\nThere are no specific next steps; answer with null.\n");
        } else {
            prompt.push_str("\nPossible next steps:\n");
            for candidate in candidates {
                let keywords = candidate.keywords.join(", ");
                let patterns = candidate.pattern_sources().collect::<Vec<_>>().join(", ");
                let _ = writeln!(
                    prompt,
                    "- If the user mentions keywords '{keywords}' or matches patterns '{patterns}', \
                     go to '{}'.",
                    candidate.next_node_id
                );
            }
        }
        prompt.push_str(
            "\nIf none of these fits, set next_node_id to null.\n\
             Respond as {\"next_node_id\": <string or null>, \"entities\": {<name>: <value>}}.",
        );

        LlmRequest::new(prompt)
            .with_system(SYSTEM_PROMPT)
            .with_output_schema(output_schema())
            .with_temperature(self.temperature)
    }
}

#[async_trait]
impl<B: LlmBackend> IntentClassifier for LlmClassifier<B> {
    async fn classify(
        &self,
        question: &str,
        input: &str,
        candidates: &[Transition],
    ) -> Result<Classification, ClassifierError> {
        let request = self.build_request(question, input, candidates);
        let response = self.backend.generate(&request).await?;
        debug!(model = %self.backend.model(), "routing response received");

        let value = match response.structured_output {
            Some(value) => value,
            None => extract_json(&response.content)?,
        };
        parse_classification(&value)
    }
}

/// JSON schema the backend is asked to honor.
fn output_schema() -> JsonValue {
    serde_json::json!({
        "type": "object",
        "properties": {
            "next_node_id": { "type": ["string", "null"] },
            "entities": {
                "type": "object",
                "additionalProperties": { "type": "string" }
            }
        },
        "required": ["next_node_id"]
    })
}

/// Pulls the JSON object out of a free-text answer, tolerating code fences
/// and surrounding prose.
fn extract_json(content: &str) -> Result<JsonValue, ClassifierError> {
    let (Some(open), Some(close)) = (content.find('{'), content.rfind('}')) else {
        return Err(ClassifierError::MalformedOutput {
            reason: "no JSON object in response".to_string(),
        });
    };
    if close < open {
        return Err(ClassifierError::MalformedOutput {
            reason: "no JSON object in response".to_string(),
        });
    }

    serde_json::from_str(&content[open..=close]).map_err(|e| ClassifierError::MalformedOutput {
        reason: e.to_string(),
    })
}

fn parse_classification(value: &JsonValue) -> Result<Classification, ClassifierError> {
    let object = value
        .as_object()
        .ok_or_else(|| ClassifierError::MalformedOutput {
            reason: format!("expected a JSON object, got {value}"),
        })?;

    let chosen_next_node_id = match object.get("next_node_id") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::String(id)) if id.trim().is_empty() => None,
        Some(JsonValue::String(id)) => Some(NodeId::new(id.trim())),
        Some(other) => {
            return Err(ClassifierError::MalformedOutput {
                reason: format!("next_node_id must be a string or null, got {other}"),
            });
        }
    };

    let mut entities = Entities::new();
    match object.get("entities") {
        None | Some(JsonValue::Null) => {}
        Some(JsonValue::Object(map)) => {
            for (name, value) in map {
                let value = match value {
                    JsonValue::Null => continue,
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                };
                entities.insert(name.clone(), value);
            }
        }
        Some(other) => {
            return Err(ClassifierError::MalformedOutput {
                reason: format!("entities must be an object, got {other}"),
            });
        }
    }

    Ok(Classification {
        chosen_next_node_id,
        entities,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LlmResponse;
    use crate::error::LlmError;
    use dialogue_agent_flow::ExpectedResponse;
    use std::sync::Mutex;

    /// Backend that returns a canned response and records the last request.
    struct ScriptedBackend {
        response: Result<LlmResponse, LlmError>,
        last_request: Mutex<Option<LlmRequest>>,
    }

    impl ScriptedBackend {
        fn new(response: Result<LlmResponse, LlmError>) -> Self {
            Self {
                response,
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            self.response.clone()
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    fn candidates() -> Vec<Transition> {
        let node = NodeId::new("ask_product_type");
        vec![
            Transition::compile(
                &node,
                &ExpectedResponse::to("tell_electronics")
                    .keyword("electronics")
                    .pattern("gadgets?"),
            )
            .expect("compile"),
        ]
    }

    #[tokio::test]
    async fn parses_structured_output() {
        let backend = ScriptedBackend::new(Ok(LlmResponse::structured(serde_json::json!({
            "next_node_id": "tell_electronics",
            "entities": { "product_type": "electronics", "budget": 300, "note": null }
        }))));
        let classifier = LlmClassifier::new(backend);

        let c = classifier
            .classify("What type?", "electronics under 300", &candidates())
            .await
            .expect("classify");

        assert_eq!(
            c.chosen_next_node_id.as_ref().map(NodeId::as_str),
            Some("tell_electronics")
        );
        assert_eq!(c.entities.get("product_type").map(String::as_str), Some("electronics"));
        assert_eq!(c.entities.get("budget").map(String::as_str), Some("300"));
        assert!(!c.entities.contains_key("note"));
    }

    #[tokio::test]
    async fn parses_fenced_text_output() {
        let backend = ScriptedBackend::new(Ok(LlmResponse::text(
            "Sure!\n```json\n{\"next_node_id\": null, \"entities\": {}}\n```",
        )));
        let c = LlmClassifier::new(backend)
            .classify("What type?", "no idea", &candidates())
            .await
            .expect("classify");
        assert_eq!(c, Classification::no_match());
    }

    #[tokio::test]
    async fn rejects_prose_without_json() {
        let backend = ScriptedBackend::new(Ok(LlmResponse::text("I think electronics.")));
        let err = LlmClassifier::new(backend)
            .classify("What type?", "electronics", &candidates())
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::MalformedOutput { .. }));
    }

    #[tokio::test]
    async fn rejects_wrong_field_types() {
        let backend = ScriptedBackend::new(Ok(LlmResponse::structured(serde_json::json!({
            "next_node_id": 7
        }))));
        let err = LlmClassifier::new(backend)
            .classify("What type?", "electronics", &candidates())
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::MalformedOutput { .. }));
    }

    #[tokio::test]
    async fn backend_failure_is_unavailable() {
        let backend = ScriptedBackend::new(Err(LlmError::Timeout));
        let err = LlmClassifier::new(backend)
            .classify("What type?", "electronics", &candidates())
            .await
            .unwrap_err();
        assert!(matches!(err, ClassifierError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn prompt_lists_candidates() {
        let backend = ScriptedBackend::new(Ok(LlmResponse::structured(
            serde_json::json!({ "next_node_id": null }),
        )));
        let classifier = LlmClassifier::new(backend);
        classifier
            .classify("What type of product?", "gadgets", &candidates())
            .await
            .expect("classify");

        let request = classifier.backend.last_request.lock().unwrap().clone().unwrap();
        assert!(request.prompt.contains("Current question: \"What type of product?\""));
        assert!(request.prompt.contains("User's response: \"gadgets\""));
        assert!(request.prompt.contains("keywords 'electronics'"));
        assert!(request.prompt.contains("patterns 'gadgets?'"));
        assert!(request.prompt.contains("go to 'tell_electronics'"));
        assert!(request.output_schema.is_some());
        assert_eq!(request.system.as_deref(), Some(SYSTEM_PROMPT));
    }
}
