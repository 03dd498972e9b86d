//! Lookup action registry.
//!
//! Actions are side-effect-free lookups that run when the conversation
//! arrives at a node naming them. Each action declares the entity names it
//! takes as arguments and the template slot its output binds to.

use crate::error::ActionError;
use async_trait::async_trait;
use dialogue_agent_core::Entities;
use dialogue_agent_flow::{ConfigError, NodeGraph};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Slot every action result is bound to, in addition to its own slot.
pub const ACTION_RESULT_SLOT: &str = "action_result";

/// Declaration of an action's call contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    /// Unique action name, as referenced by node `action` fields.
    pub name: String,
    /// Entity names passed as arguments, in order.
    pub arguments: Vec<String>,
    /// Template slot the result binds to.
    pub output_slot: String,
}

impl ActionSpec {
    /// Creates a spec with no arguments whose output binds to `action_result`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            output_slot: ACTION_RESULT_SLOT.to_string(),
        }
    }

    /// Adds an argument, taken from the entity of the same name.
    #[must_use]
    pub fn argument(mut self, name: impl Into<String>) -> Self {
        self.arguments.push(name.into());
        self
    }

    /// Sets the slot the result binds to.
    #[must_use]
    pub fn output_slot(mut self, slot: impl Into<String>) -> Self {
        self.output_slot = slot.into();
        self
    }

    /// Picks this action's arguments out of the accumulated entities.
    #[must_use]
    pub fn arguments_from(&self, entities: &Entities) -> ActionArgs {
        ActionArgs(
            self.arguments
                .iter()
                .map(|name| {
                    let value = entities.get(name).cloned().unwrap_or_default();
                    (name.clone(), value)
                })
                .collect(),
        )
    }

    /// Template slots filled by a result of this action.
    #[must_use]
    pub fn bind(&self, result: &str) -> Entities {
        let mut slots = Entities::new();
        slots.insert(ACTION_RESULT_SLOT.to_string(), result.to_string());
        slots.insert(self.output_slot.clone(), result.to_string());
        slots
    }
}

/// Arguments handed to an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionArgs(Entities);

impl ActionArgs {
    /// Returns the named argument; missing arguments read as empty.
    #[must_use]
    pub fn get(&self, name: &str) -> &str {
        self.0.get(name).map_or("", String::as_str)
    }
}

/// Trait for lookup actions.
#[async_trait]
pub trait Action: Send + Sync {
    /// Runs the lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup could not produce a result.
    async fn invoke(&self, args: &ActionArgs) -> Result<String, ActionError>;
}

/// Adapter for plain functions.
struct FnAction<F>(F);

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: Fn(&ActionArgs) -> String + Send + Sync,
{
    async fn invoke(&self, args: &ActionArgs) -> Result<String, ActionError> {
        Ok((self.0)(args))
    }
}

struct Registered {
    spec: ActionSpec,
    action: Arc<dyn Action>,
}

/// Registry of available actions.
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Registered>,
}

impl ActionRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Creates a registry holding the built-in lookups.
    #[must_use]
    pub fn with_builtin_lookups() -> Self {
        let mut registry = Self::new();
        crate::lookup::register_builtin_lookups(&mut registry);
        registry
    }

    /// Registers an action. A later registration under the same name replaces
    /// the earlier one.
    pub fn register(&mut self, spec: ActionSpec, action: impl Action + 'static) {
        self.actions.insert(
            spec.name.clone(),
            Registered {
                spec,
                action: Arc::new(action),
            },
        );
    }

    /// Registers a plain function as an action.
    pub fn register_fn<F>(&mut self, spec: ActionSpec, f: F)
    where
        F: Fn(&ActionArgs) -> String + Send + Sync + 'static,
    {
        self.register(spec, FnAction(f));
    }

    /// Gets an action's spec by name.
    #[must_use]
    pub fn spec(&self, name: &str) -> Option<&ActionSpec> {
        self.actions.get(name).map(|r| &r.spec)
    }

    /// Returns whether an action is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Returns the registered action names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs the named action with arguments taken from `entities`.
    ///
    /// # Errors
    ///
    /// Returns `ActionError::NotFound` for an unregistered name, or whatever
    /// the action itself reports.
    #[instrument(skip(self, entities))]
    pub async fn dispatch(&self, name: &str, entities: &Entities) -> Result<String, ActionError> {
        let registered = self.actions.get(name).ok_or_else(|| ActionError::NotFound {
            name: name.to_string(),
        })?;

        let args = registered.spec.arguments_from(entities);
        debug!(?args, "dispatching action");
        registered.action.invoke(&args).await
    }

    /// Checks that every action named by the graph is registered.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnregisteredAction` for the first node whose
    /// action is missing.
    pub fn ensure_covers(&self, graph: &NodeGraph) -> Result<(), ConfigError> {
        for (node_id, action) in graph.actions() {
            if !self.contains(action) {
                return Err(ConfigError::UnregisteredAction {
                    node_id: node_id.clone(),
                    action: action.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("actions", &self.names())
            .finish()
    }
}
