//! Interactive dialogue-agent host.
//!
//! Reads one user input per line from stdin and prints the engine's response
//! to stdout. Logs go to stderr.
//!
//! Routing uses the lexical `KeywordClassifier`. Model providers are not
//! bundled; see `dialogue_agent_nlu::LlmBackend` for plugging one into a
//! custom host.

mod config;

use crate::config::AgentConfig;
use dialogue_agent_conversation::{
    ActionRegistry, DialogueEngine, DialogueState, InMemorySessionStore,
};
use dialogue_agent_core::SessionId;
use dialogue_agent_flow::load_flow;
use dialogue_agent_nlu::{KeywordClassifier, TransitionResolver};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let config = AgentConfig::load().expect("failed to load configuration");

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let graph = load_flow(&config.flow_path, config.start_node.as_str())
        .expect("failed to load conversation flow");
    let actions = ActionRegistry::with_builtin_lookups();
    actions
        .ensure_covers(&graph)
        .expect("conversation flow uses an unregistered action");

    let store = InMemorySessionStore::new(graph.start_node().clone());
    let engine = DialogueEngine::new(
        Arc::new(graph),
        store,
        Arc::new(actions),
        TransitionResolver::new(KeywordClassifier::new()),
    );

    let session_id = config
        .session_id
        .map_or_else(SessionId::generate, SessionId::new);
    tracing::info!(%session_id, "Starting conversation");

    let mut stdout = tokio::io::stdout();
    if let Err(e) = say(&mut stdout, &engine.prompt(&session_id).await).await {
        tracing::error!(error = %e, "Failed to write to stdout");
        return;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        };

        let input = match line {
            Ok(Some(input)) => input,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read from stdin");
                break;
            }
        };

        let outcome = engine.run_turn(&session_id, input.trim()).await;
        if let Err(e) = say(&mut stdout, &outcome.response).await {
            tracing::error!(error = %e, "Failed to write to stdout");
            break;
        }
        if outcome.state == DialogueState::TerminalReached {
            tracing::info!(node_id = %outcome.node_id, "Conversation finished");
            break;
        }
    }
}

async fn say(stdout: &mut Stdout, text: &str) -> std::io::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn bundled_flow() -> dialogue_agent_flow::NodeGraph {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/flow.yaml");
        load_flow(&path, "start").expect("bundled flow loads")
    }

    #[test]
    fn bundled_flow_is_fully_wired() {
        let graph = bundled_flow();
        assert!(graph.unreachable_nodes().is_empty());
        ActionRegistry::with_builtin_lookups()
            .ensure_covers(&graph)
            .expect("bundled flow only uses built-in lookups");
    }

    #[tokio::test]
    async fn bundled_flow_weather_conversation() {
        let engine = DialogueEngine::new(
            Arc::new(bundled_flow()),
            InMemorySessionStore::new("start"),
            Arc::new(ActionRegistry::with_builtin_lookups()),
            TransitionResolver::new(KeywordClassifier::new()),
        );
        let id = SessionId::new("cli-test");

        assert_eq!(
            engine.process_turn(&id, "what's the weather like?").await,
            "Which city would you like the weather for?"
        );
        assert_eq!(
            engine.process_turn(&id, "Sydney").await,
            "The weather in Sydney is sunny with 25 degrees Celsius. \
             Is there anything else I can help with?"
        );
        let outcome = engine.run_turn(&id, "no, that's all").await;
        assert_eq!(outcome.response, "Thanks for chatting. Goodbye!");
        assert_eq!(outcome.state, DialogueState::TerminalReached);
    }
}
