//! Runs a single query through the agent and prints the answer.
//!
//! ```text
//! OPENROUTER_API_KEY=... cargo run -p ask-agent -- "What is 12 * (3 + 4)?"
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use react_agent::{
    default_toolkit, init_tracing, Agent, AgentError, AgentHook, AppConfig, Correction,
    MetricsTracker, OpenRouterClient,
};

/// Prints each step to stderr so the reasoning can be followed.
struct StepPrinter;

#[async_trait]
impl AgentHook for StepPrinter {
    async fn before_tool_call(&self, name: &str, input: Option<&str>) {
        eprintln!("-> {name}({})", input.unwrap_or_default());
    }

    async fn after_tool_result(&self, _name: &str, observation: &str) {
        eprintln!("<- {observation}");
    }

    async fn on_correction(&self, correction: &Correction) {
        eprintln!("!! {correction:?}");
    }
}

#[tokio::main]
async fn main() -> react_agent::Result<()> {
    let query = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    if query.trim().is_empty() {
        return Err(AgentError::Config("usage: ask-agent <question>".into()));
    }

    AppConfig::load_env_file(None);
    let config = AppConfig::load(None)?;
    init_tracing(&config.logging)?;
    if !config.model.has_api_key() {
        tracing::warn!("OPENROUTER_API_KEY is not set");
    }

    let model = OpenRouterClient::from_config(&config.model)?;
    let agent = Agent::new(Arc::new(model))
        .with_tools(default_toolkit(&config.tools)?)
        .with_config(&config.agent)
        .with_metrics(MetricsTracker::default())
        .with_hook(Arc::new(StepPrinter));

    let run = agent.run(query).await;
    println!("{}", run.outcome.message());
    Ok(())
}
