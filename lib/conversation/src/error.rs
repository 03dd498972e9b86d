//! Error types for the conversation crate.
//!
//! - `SessionError`: the session store could not persist a turn
//! - `ActionError`: a lookup action could not be dispatched

use std::fmt;

/// Errors from session store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Storage operation failed.
    StorageFailed { reason: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageFailed { reason } => {
                write!(f, "session storage failed: {reason}")
            }
        }
    }
}

impl std::error::Error for SessionError {}

/// Errors from action dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// No action is registered under this name.
    NotFound { name: String },
    /// The action ran but could not produce a result.
    ExecutionFailed { name: String, reason: String },
}

impl ActionError {
    /// Text shown to the user in place of the action's output.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { name } => format!("Error: Tool '{name}' not found."),
            Self::ExecutionFailed { name, .. } => {
                format!("Error: Tool '{name}' failed.")
            }
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { name } => write!(f, "action not found: {name}"),
            Self::ExecutionFailed { name, reason } => {
                write!(f, "action '{name}' failed: {reason}")
            }
        }
    }
}

impl std::error::Error for ActionError {}
