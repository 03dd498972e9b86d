//! Intent classification and transition resolution for dialogue-agent.
//!
//! This crate provides:
//!
//! - **Classifier contract**: the `IntentClassifier` trait the engine's
//!   NLU collaborator implements
//! - **Keyword Classifier**: lexical keyword/pattern routing with
//!   named-capture entity extraction
//! - **LLM Classifier**: prompt construction and structured-output parsing
//!   over any `LlmBackend`
//! - **Transition Resolver**: first-match policy and default fallback on
//!   top of a classifier
//!
//! No `LlmBackend` implementation ships in this workspace. A host that wants
//! model-backed routing implements `LlmBackend` for its provider client and
//! passes `LlmClassifier::new(backend)` to `TransitionResolver::new`.

pub mod backend;
pub mod classifier;
pub mod error;
pub mod keyword;
pub mod llm;
pub mod resolver;

pub use backend::{LlmBackend, LlmRequest, LlmResponse};
pub use classifier::{Classification, IntentClassifier};
pub use error::{ClassifierError, LlmError, ResolutionError};
pub use keyword::KeywordClassifier;
pub use llm::LlmClassifier;
pub use resolver::{MatchSource, Resolution, TransitionResolver};
