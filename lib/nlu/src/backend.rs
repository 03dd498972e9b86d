//! LLM backend abstraction.
//!
//! Provides the interface the [`LlmClassifier`](crate::LlmClassifier) talks
//! to. Concrete providers (local Ollama, hosted APIs) live outside this
//! workspace and only need to implement [`LlmBackend`].

use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A request to an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// The prompt to send.
    pub prompt: String,
    /// System prompt, if any.
    pub system: Option<String>,
    /// Optional JSON schema for structured output.
    pub output_schema: Option<JsonValue>,
    /// Temperature for sampling (0.0 - 1.0).
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Creates a new simple request with just a prompt.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            output_schema: None,
            temperature: None,
        }
    }

    /// Adds a system prompt.
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Adds an output schema for structured output.
    #[must_use]
    pub fn with_output_schema(mut self, schema: JsonValue) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// A response from an LLM.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated content.
    pub content: String,
    /// Structured output (if output_schema was provided and honored).
    pub structured_output: Option<JsonValue>,
    /// Model that generated the response.
    pub model: String,
}

impl LlmResponse {
    /// Creates a plain-text response.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Creates a response carrying structured output.
    #[must_use]
    pub fn structured(output: JsonValue) -> Self {
        Self {
            content: output.to_string(),
            structured_output: Some(output),
            model: String::new(),
        }
    }
}

/// Trait for LLM backends.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generates a response for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the LLM call fails.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Returns the model name.
    fn model(&self) -> &str;
}
