//! Core types and utilities for the dialogue-agent workspace.
//!
//! This crate provides the string key types used to address flow nodes and
//! conversation sessions, plus the shared `Result` alias used at I/O
//! boundaries.

pub mod error;
pub mod id;

use std::collections::HashMap;

pub use error::Result;
pub use id::{NodeId, SessionId};

/// Named values extracted from user input (e.g. `location`, `order_number`).
///
/// Sessions accumulate these across turns with last-write-wins semantics.
pub type Entities = HashMap<String, String>;
