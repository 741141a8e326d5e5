//! Built-in tools available to the agent:
//! - `calculate`: arithmetic over a closed expression grammar
//! - `time`: current local date and time
//! - `weather`: current conditions from wttr.in
//! - `wikipedia_search`: article summaries from Wikipedia

pub mod calculator;
pub mod clock;
pub mod weather;
pub mod wikipedia;

use std::time::Duration;

pub use calculator::CalculateTool;
pub use clock::TimeTool;
pub use weather::WeatherTool;
pub use wikipedia::WikipediaSearchTool;

use crate::config::ToolsConfig;
use crate::error::{AgentError, Result};
use crate::tool::ToolRegistry;

/// Registry holding the four built-in tools. The network-backed tools share one
/// HTTP client bounded by `timeout_secs`.
pub fn default_toolkit(config: &ToolsConfig) -> Result<ToolRegistry> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|err| AgentError::Config(format!("tool http client error: {err}")))?;

    let mut registry = ToolRegistry::new();
    registry.register(CalculateTool);
    registry.register(TimeTool);
    registry.register(WeatherTool::new(http.clone(), &config.weather_base_url));
    registry.register(WikipediaSearchTool::new(http, &config.wikipedia_base_url));
    Ok(registry)
}
