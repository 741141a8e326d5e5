use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::tools::weather::DEFAULT_WEATHER_BASE_URL;
use crate::tools::wikipedia::DEFAULT_WIKIPEDIA_BASE_URL;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    5000
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_model_timeout(),
        }
    }
}

impl ModelConfig {
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

fn default_model_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_max_errors")]
    pub max_errors: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_errors: default_max_errors(),
        }
    }
}

fn default_max_iterations() -> usize {
    10
}

fn default_max_errors() -> usize {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolsConfig {
    #[serde(default = "default_tool_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,
    #[serde(default = "default_wikipedia_base_url")]
    pub wikipedia_base_url: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_tool_timeout(),
            weather_base_url: default_weather_base_url(),
            wikipedia_base_url: default_wikipedia_base_url(),
        }
    }
}

fn default_tool_timeout() -> u64 {
    10
}

fn default_weather_base_url() -> String {
    DEFAULT_WEATHER_BASE_URL.into()
}

fn default_wikipedia_base_url() -> String {
    DEFAULT_WIKIPEDIA_BASE_URL.into()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directives; `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_filter() -> String {
    "react_agent=info,tower_http=info".into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw)
            .map_err(|err| AgentError::Config(format!("Failed to parse configuration: {err}")))
    }

    /// Defaults, then the file if one is given, then environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        cfg.apply_env();
        Ok(cfg)
    }

    /// Loads variables from a `.env` file into the process environment without
    /// overriding ones already set. With no path, searches the working directory and
    /// its parents. Returns the file that was read, if any.
    pub fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
        match path {
            Some(path) => dotenv::from_path(path).ok().map(|_| path.to_path_buf()),
            None => dotenv::dotenv().ok(),
        }
    }

    pub fn from_env_or_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(Some(path.as_ref()))
    }

    /// Applies environment overrides. Values that fail to parse are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(key) = env::var("OPENROUTER_API_KEY") {
            self.model.api_key = Some(key);
        }
        if let Ok(model) = env::var("REACT_AGENT_MODEL") {
            self.model.model = model;
        }
        if let Ok(base_url) = env::var("REACT_AGENT_BASE_URL") {
            self.model.base_url = base_url;
        }
        if let Ok(host) = env::var("REACT_AGENT_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("REACT_AGENT_PORT") {
            if let Ok(parsed) = port.parse::<u16>() {
                self.server.port = parsed;
            }
        }
        if let Ok(max) = env::var("REACT_AGENT_MAX_ITERATIONS") {
            if let Ok(parsed) = max.parse::<usize>() {
                self.agent.max_iterations = parsed;
            }
        }
        if let Ok(max) = env::var("REACT_AGENT_MAX_ERRORS") {
            if let Ok(parsed) = max.parse::<usize>() {
                self.agent.max_errors = parsed;
            }
        }
        if let Ok(format) = env::var("REACT_AGENT_LOG_FORMAT") {
            match format.to_ascii_lowercase().as_str() {
                "json" => self.logging.format = LogFormat::Json,
                "pretty" => self.logging.format = LogFormat::Pretty,
                _ => {}
            }
        }
    }
}
