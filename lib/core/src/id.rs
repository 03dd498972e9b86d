//! Strongly-typed string keys for flow nodes and conversation sessions.
//!
//! Node ids come from the flow configuration and session ids come from
//! whatever host drives the engine, so both are opaque strings rather than
//! generated identifiers. Keeping them as distinct types stops a session id
//! from being used to look up a node (and vice versa).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use ulid::Ulid;

/// Macro to generate a strongly-typed wrapper around an opaque string key.
macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a key from any string-like value.
            #[must_use]
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// Returns the key as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the key, returning the owned string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_key!(
    /// Identifier of a node in the conversation flow.
    NodeId
);

define_key!(
    /// Opaque identifier of a conversation session.
    SessionId
);

impl SessionId {
    /// Prefix used for generated session ids.
    pub const PREFIX: &'static str = "sess";

    /// Generates a fresh, lexicographically sortable session id.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{}_{}", Self::PREFIX, Ulid::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn node_id_display_is_raw_key() {
        let id = NodeId::new("ask_location");
        assert_eq!(id.to_string(), "ask_location");
        assert_eq!(id.as_str(), "ask_location");
    }

    #[test]
    fn generated_session_ids_are_prefixed_and_unique() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert!(a.as_str().starts_with("sess_"));
        assert_ne!(a, b);
    }

    #[test]
    fn map_lookup_by_str() {
        let mut map = HashMap::new();
        map.insert(NodeId::from("start"), 1);
        assert_eq!(map.get("start"), Some(&1));
        assert!(map.get("missing").is_none());
    }

    #[test]
    fn serde_is_transparent() {
        let id = SessionId::new("user-42");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"user-42\"");
        let parsed: SessionId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, parsed);
    }
}
