//! The dialogue engine.
//!
//! Each turn runs the same loop:
//! 1. Load the session and its current node
//! 2. Terminal node: re-render its question and stop
//! 3. Resolve the next node from the user's input
//! 4. Apply the transition to the session store (the turn's only write)
//! 5. Run the next node's action, if any
//! 6. Render the next node's question
//!
//! Per-turn failures never escape: they become a user-facing message and
//! leave the session either unchanged or reset to the start node.

use crate::action::ActionRegistry;
use crate::error::ActionError;
use crate::session::SessionStore;
use crate::template;
use dialogue_agent_core::{Entities, NodeId, SessionId};
use dialogue_agent_flow::{GraphError, Node, NodeGraph};
use dialogue_agent_nlu::{IntentClassifier, TransitionResolver};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Shown when the input could not be routed.
pub const CLARIFY_MESSAGE: &str = "I'm not sure how to proceed. Could you please rephrase?";

/// Shown when the conversation points at a node that does not exist.
pub const LOST_WAY_MESSAGE: &str = "I'm sorry, I seem to have lost my way. Can we start over?";

/// Where a session stands after a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    /// The current node expects an answer.
    AwaitingTransition,
    /// The current node ends the conversation path.
    TerminalReached,
}

impl DialogueState {
    fn of(node: &Node) -> Self {
        if node.is_terminal() {
            Self::TerminalReached
        } else {
            Self::AwaitingTransition
        }
    }
}

/// The result of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOutcome {
    /// Text to show the user.
    pub response: String,
    /// The node the session is at after the turn.
    pub node_id: NodeId,
    /// Whether the conversation can continue from here.
    pub state: DialogueState,
}

/// Drives conversations over a node graph.
pub struct DialogueEngine<S, C> {
    graph: Arc<NodeGraph>,
    store: S,
    actions: Arc<ActionRegistry>,
    resolver: TransitionResolver<C>,
    turn_locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl<S: SessionStore, C: IntentClassifier> DialogueEngine<S, C> {
    /// Creates an engine from its collaborators.
    pub fn new(
        graph: Arc<NodeGraph>,
        store: S,
        actions: Arc<ActionRegistry>,
        resolver: TransitionResolver<C>,
    ) -> Self {
        Self {
            graph,
            store,
            actions,
            resolver,
            turn_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the node graph.
    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    /// Returns the session store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Processes one user input and returns the response text.
    pub async fn process_turn(&self, session_id: &SessionId, input: &str) -> String {
        self.run_turn(session_id, input).await.response
    }

    /// Renders the session's current question without changing anything.
    ///
    /// Hosts use this to open a conversation.
    pub async fn prompt(&self, session_id: &SessionId) -> String {
        let session = self.store.get(session_id).await;
        match self.graph.lookup(session.current_node_id.as_str()) {
            Ok(node) => template::render(&node.question, &Entities::new(), &session.entities),
            Err(e) => {
                warn!(error = %e, "session points at an unknown node");
                LOST_WAY_MESSAGE.to_string()
            }
        }
    }

    /// Processes one user input.
    ///
    /// Turns for the same session run one at a time; different sessions
    /// proceed concurrently.
    #[instrument(skip(self, session_id, input), fields(session_id = %session_id))]
    pub async fn run_turn(&self, session_id: &SessionId, input: &str) -> TurnOutcome {
        let turn_lock = self.turn_lock(session_id).await;
        let outcome = {
            let _turn = turn_lock.lock().await;
            self.apply_turn(session_id, input).await
        };
        self.release_turn_lock(session_id, turn_lock).await;
        outcome
    }

    async fn apply_turn(&self, session_id: &SessionId, input: &str) -> TurnOutcome {
        let session = self.store.get(session_id).await;
        let current = match self.graph.lookup(session.current_node_id.as_str()) {
            Ok(node) => node,
            Err(e) => return self.recover(session_id, &e).await,
        };

        if current.is_terminal() {
            debug!(node_id = %current.id, "terminal node; re-rendering");
            return TurnOutcome {
                response: template::render(&current.question, &Entities::new(), &session.entities),
                node_id: current.id.clone(),
                state: DialogueState::TerminalReached,
            };
        }

        let resolution = match self.resolver.resolve(current, input, &session.entities).await {
            Ok(resolution) => resolution,
            Err(e) => {
                warn!(error = %e, "could not resolve transition");
                return clarify(current);
            }
        };

        // Checked before the write so a bad target never lands in the store.
        let next = match self.graph.lookup(resolution.next_node_id.as_str()) {
            Ok(node) => node,
            Err(e) => return self.recover(session_id, &e).await,
        };

        let mut accumulated = session.entities;
        accumulated.extend(resolution.entities.clone());

        if let Err(e) = self
            .store
            .update(session_id, next.id.clone(), resolution.entities)
            .await
        {
            error!(error = %e, "failed to store transition");
            return clarify(current);
        }
        info!(from = %current.id, to = %next.id, "transitioned");

        let response = match self.run_action(next, &accumulated).await {
            Ok(slots) => template::render(&next.question, &slots, &accumulated),
            Err(e) => {
                warn!(error = %e, "action failed");
                e.user_message()
            }
        };

        TurnOutcome {
            response,
            node_id: next.id.clone(),
            state: DialogueState::of(next),
        }
    }

    /// Runs the node's action and returns the template slots it fills.
    async fn run_action(&self, node: &Node, entities: &Entities) -> Result<Entities, ActionError> {
        let Some(name) = node.action.as_deref() else {
            return Ok(Entities::new());
        };

        let result = self.actions.dispatch(name, entities).await?;
        let slots = match self.actions.spec(name) {
            Some(spec) => spec.bind(&result),
            None => Entities::new(),
        };
        Ok(slots)
    }

    /// Resets the session to the start node after it lost its place.
    async fn recover(&self, session_id: &SessionId, cause: &GraphError) -> TurnOutcome {
        error!(error = %cause, "resetting session to the start node");
        let start = self.graph.start_node().clone();
        if let Err(e) = self
            .store
            .update(session_id, start.clone(), Entities::new())
            .await
        {
            error!(error = %e, "failed to reset session");
        }

        let state = self
            .graph
            .get(start.as_str())
            .map_or(DialogueState::AwaitingTransition, DialogueState::of);
        TurnOutcome {
            response: LOST_WAY_MESSAGE.to_string(),
            node_id: start,
            state,
        }
    }

    async fn turn_lock(&self, session_id: &SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.turn_locks.lock().await;
        Arc::clone(locks.entry(session_id.clone()).or_default())
    }

    /// Drops this turn's handle and forgets the lock once nobody else holds it.
    ///
    /// Handles are only cloned under the map lock, so the count cannot grow
    /// while it is checked here.
    async fn release_turn_lock(&self, session_id: &SessionId, turn_lock: Arc<Mutex<()>>) {
        let mut locks = self.turn_locks.lock().await;
        drop(turn_lock);
        if locks
            .get(session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(session_id);
        }
    }
}

fn clarify(current: &Node) -> TurnOutcome {
    TurnOutcome {
        response: CLARIFY_MESSAGE.to_string(),
        node_id: current.id.clone(),
        state: DialogueState::AwaitingTransition,
    }
}
