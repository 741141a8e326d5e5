use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AgentError, Result};

/// Whether a tool consumes the model's `action_input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolArity {
    /// The tool takes no input; whatever the model sent is ignored.
    None,
    /// The tool takes a single string, possibly empty.
    Text,
}

/// A named capability the agent can invoke.
///
/// Tools own their failure handling: an internal error is reported as text in the
/// returned observation and never escapes `call`.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    fn arity(&self) -> ToolArity {
        ToolArity::Text
    }

    async fn call(&self, input: Option<&str>) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    pub arity: ToolArity,
}

/// Fixed set of tools handed to an agent at construction.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn describe(&self) -> Vec<ToolDescription> {
        self.tools
            .values()
            .map(|tool| ToolDescription {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                arity: tool.arity(),
            })
            .collect()
    }

    /// Invokes `name` with the model-supplied input.
    ///
    /// Only an unknown name is an error. Input-less tools never see `input`; text
    /// tools get an empty string when the model sent none.
    pub async fn dispatch(&self, name: &str, input: Option<&str>) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        let observation = match tool.arity() {
            ToolArity::None => tool.call(None).await,
            ToolArity::Text => tool.call(Some(input.unwrap_or_default())).await,
        };
        Ok(observation)
    }
}
