//! Conversation session state.
//!
//! A session is a pointer into the node graph plus the entities gathered so
//! far. Sessions are created implicitly the first time an id is seen and are
//! only ever mutated through [`SessionStore::update`].

use crate::error::SessionError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dialogue_agent_core::{Entities, NodeId, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// A conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// The node the conversation is currently at.
    pub current_node_id: NodeId,
    /// Entities accumulated across turns.
    pub entities: Entities,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session was last updated.
    pub last_active_at: DateTime<Utc>,
    /// Number of updates applied.
    pub turn_count: u64,
}

impl Session {
    /// Creates a session positioned at `start` with no entities.
    #[must_use]
    pub fn new(id: SessionId, start: NodeId) -> Self {
        let now = Utc::now();
        Self {
            id,
            current_node_id: start,
            entities: Entities::new(),
            created_at: now,
            last_active_at: now,
            turn_count: 0,
        }
    }

    /// Moves to `next` and merges `delta` into the entities.
    ///
    /// Later values overwrite earlier ones.
    pub fn apply(&mut self, next: NodeId, delta: Entities) {
        self.current_node_id = next;
        self.entities.extend(delta);
        self.last_active_at = Utc::now();
        self.turn_count += 1;
    }
}

/// Trait for session storage.
///
/// Implementations must apply each `update` atomically; turns for different
/// sessions must not observe each other's partial state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the session, creating it at the start node if it is unseen.
    async fn get(&self, id: &SessionId) -> Session;

    /// Sets the current node and merges `entity_delta` in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage could not persist the change.
    async fn update(
        &self,
        id: &SessionId,
        current_node_id: NodeId,
        entity_delta: Entities,
    ) -> Result<(), SessionError>;
}

/// Process-local session store.
#[derive(Debug)]
pub struct InMemorySessionStore {
    start: NodeId,
    sessions: Mutex<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    /// Creates an empty store whose new sessions begin at `start`.
    #[must_use]
    pub fn new(start: impl Into<NodeId>) -> Self {
        Self {
            start: start.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the number of sessions seen so far.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Returns whether no session has been seen yet.
    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Session {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(id.clone())
            .or_insert_with(|| Session::new(id.clone(), self.start.clone()))
            .clone()
    }

    async fn update(
        &self,
        id: &SessionId,
        current_node_id: NodeId,
        entity_delta: Entities,
    ) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(id.clone())
            .or_insert_with(|| Session::new(id.clone(), self.start.clone()))
            .apply(current_node_id, entity_delta);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(pairs: &[(&str, &str)]) -> Entities {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn unseen_session_starts_at_start_node() {
        let store = InMemorySessionStore::new("start");
        assert!(store.is_empty().await);

        let session = store.get(&SessionId::new("alice")).await;
        assert_eq!(session.current_node_id.as_str(), "start");
        assert!(session.entities.is_empty());
        assert_eq!(session.turn_count, 0);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn entities_are_last_write_wins() {
        let store = InMemorySessionStore::new("start");
        let id = SessionId::new("alice");

        store
            .update(&id, NodeId::new("ask_location"), delta(&[("location", "melbourne")]))
            .await
            .expect("update");
        store
            .update(&id, NodeId::new("weather_report"), delta(&[("location", "sydney")]))
            .await
            .expect("update");

        let session = store.get(&id).await;
        assert_eq!(session.current_node_id.as_str(), "weather_report");
        assert_eq!(session.entities.get("location").map(String::as_str), Some("sydney"));
        assert_eq!(session.turn_count, 2);
        assert!(session.last_active_at >= session.created_at);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = InMemorySessionStore::new("start");
        let alice = SessionId::new("alice");
        let bob = SessionId::new("bob");

        store
            .update(&alice, NodeId::new("ask_order_number"), delta(&[("order_number", "1")]))
            .await
            .expect("update");

        let bob_session = store.get(&bob).await;
        assert_eq!(bob_session.current_node_id.as_str(), "start");
        assert!(bob_session.entities.is_empty());

        let alice_session = store.get(&alice).await;
        assert_eq!(alice_session.current_node_id.as_str(), "ask_order_number");
    }

    #[test]
    fn apply_merges_delta() {
        let mut session = Session::new(SessionId::new("s"), NodeId::new("start"));
        session.apply(NodeId::new("a"), delta(&[("x", "1"), ("y", "2")]));
        session.apply(NodeId::new("b"), delta(&[("x", "3")]));
        assert_eq!(session.entities, delta(&[("x", "3"), ("y", "2")]));
        assert_eq!(session.current_node_id.as_str(), "b");
    }
}
