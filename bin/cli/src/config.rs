//! Host configuration.
//!
//! Loaded via the `config` crate from an optional `dialogue-agent.*` file in
//! the working directory, then from `DIALOGUE_AGENT_*` environment
//! variables (nested keys separated by `__`). Every field has a default, so
//! an empty environment is a valid configuration.

use serde::Deserialize;
use std::path::PathBuf;

/// Command-line host configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Path to the YAML conversation flow.
    #[serde(default = "default_flow_path")]
    pub flow_path: PathBuf,

    /// Node new sessions start at.
    #[serde(default = "default_start_node")]
    pub start_node: String,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Session id to converse under; a fresh one is generated when unset.
    #[serde(default)]
    pub session_id: Option<String>,
}

fn default_flow_path() -> PathBuf {
    PathBuf::from("config/flow.yaml")
}

fn default_start_node() -> String {
    "start".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            flow_path: default_flow_path(),
            start_node: default_start_node(),
            log_filter: default_log_filter(),
            session_id: None,
        }
    }
}

impl AgentConfig {
    /// Loads configuration from `dialogue-agent.*` and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a source is present but malformed.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with(config::File::with_name("dialogue-agent").required(false))
    }

    fn load_with<S>(file: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("DIALOGUE_AGENT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.flow_path, PathBuf::from("config/flow.yaml"));
        assert_eq!(config.start_node, "start");
        assert_eq!(config.log_filter, "info");
        assert!(config.session_id.is_none());
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".yaml")
            .tempfile()
            .expect("tempfile");
        writeln!(file, "flow_path: flows/support.yaml\nsession_id: sess_fixed").expect("write");

        let config = AgentConfig::load_with(config::File::from(file.path())).expect("load");
        assert_eq!(config.flow_path, PathBuf::from("flows/support.yaml"));
        assert_eq!(config.session_id.as_deref(), Some("sess_fixed"));
        assert_eq!(config.start_node, "start");
        assert_eq!(config.log_filter, "info");
    }
}
