//! Question template rendering.
//!
//! Placeholders are `{identifier}`. Each resolves from the action slots
//! first, then from the session entities. Anything unresolved is left in the
//! output exactly as written.

use dialogue_agent_core::Entities;
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Renders `template`, filling placeholders from `slots` then `entities`.
#[must_use]
pub fn render(template: &str, slots: &Entities, entities: &Entities) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let name = &caps[1];
            slots
                .get(name)
                .or_else(|| entities.get(name))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
