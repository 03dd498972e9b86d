//! Conversation runtime for dialogue-agent.
//!
//! This crate provides:
//!
//! - **Sessions**: per-conversation state and the store that holds it
//! - **Actions**: the lookup registry and the built-in canned lookups
//! - **Templates**: `{placeholder}` rendering of node questions
//! - **Engine**: the per-turn state machine tying it all together

pub mod action;
pub mod engine;
pub mod error;
pub mod lookup;
pub mod session;
pub mod template;

pub use action::{ACTION_RESULT_SLOT, Action, ActionArgs, ActionRegistry, ActionSpec};
pub use engine::{CLARIFY_MESSAGE, DialogueEngine, DialogueState, LOST_WAY_MESSAGE, TurnOutcome};
pub use error::{ActionError, SessionError};
pub use session::{InMemorySessionStore, Session, SessionStore};
