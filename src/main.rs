//! ReAct agent HTTP server entry point.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use react_agent::{
    default_toolkit, init_tracing, Agent, AgentError, AgentServer, AppConfig, MetricsTracker,
    OpenRouterClient,
};
use tracing::{info, warn};

const DEFAULT_CONFIG_FILE: &str = "react-agent.toml";
const RECENT_RUNS: usize = 256;

#[tokio::main]
async fn main() -> react_agent::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()));
    let env_file = AppConfig::load_env_file(None);
    let config = AppConfig::load(config_path.as_deref())?;
    init_tracing(&config.logging)?;

    if let Some(path) = env_file.as_deref().map(Path::display) {
        info!(%path, "loaded environment file");
    }

    if let Some(path) = config_path.as_deref().map(Path::display) {
        info!(%path, "loaded configuration file");
    }
    if !config.model.has_api_key() {
        warn!("OPENROUTER_API_KEY is not set; every query will fail until it is provided");
    }

    let model = OpenRouterClient::from_config(&config.model)?;
    let tools = default_toolkit(&config.tools)?;
    info!(model = model.model(), tools = ?tools.names(), "agent ready");

    let agent = Agent::new(std::sync::Arc::new(model))
        .with_tools(tools)
        .with_config(&config.agent)
        .with_metrics(MetricsTracker::with_capacity(RECENT_RUNS));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|err| AgentError::Config(format!("invalid listen address: {err}")))?;
    info!("open http://{addr} in your browser");

    AgentServer::new(agent).serve(addr).await
}
