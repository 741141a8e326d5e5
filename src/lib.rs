//! A ReAct-style agent runtime.
//!
//! The crate provides:
//! - A language model abstraction (`LanguageModel`) with an OpenRouter client.
//! - A strict-JSON reply parser (`parse_response`).
//! - A tool interface (`Tool` and `ToolRegistry`) and the four built-in tools.
//! - An `Agent` that loops between the model and tools until an answer or a bound.

mod agent;
mod config;
mod error;
mod hooks;
mod llm;
mod memory;
mod message;
mod metrics;
mod prompt;
mod response;
#[cfg(feature = "server")]
mod server;
mod telemetry;
mod tool;
pub mod tools;

pub use agent::{
    Agent, AgentRun, Correction, Outcome, APOLOGY_MESSAGE, DEFAULT_MAX_ERRORS,
    DEFAULT_MAX_ITERATIONS, ITERATION_LIMIT_MESSAGE, MODEL_UNAVAILABLE_MESSAGE,
    NO_ANSWER_MESSAGE,
};
pub use config::{
    AgentConfig, AppConfig, LogFormat, LoggingConfig, ModelConfig, ServerConfig, ToolsConfig,
};
pub use error::{AgentError, Result};
pub use hooks::AgentHook;
pub use llm::{LanguageModel, OpenRouterClient, StubModel, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use memory::ConversationMemory;
pub use message::{Message, Role};
pub use metrics::{MetricsTracker, RunGuard, RunReport};
pub use prompt::build_system_prompt;
pub use response::{parse_response, AgentResponse, ParseError};
#[cfg(feature = "server")]
pub use server::AgentServer;
pub use telemetry::init_tracing;
pub use tool::{Tool, ToolArity, ToolDescription, ToolRegistry};
pub use tools::default_toolkit;
