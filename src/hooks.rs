use async_trait::async_trait;

use crate::agent::{Correction, Outcome};
use crate::message::Message;

/// Observer of the agent loop. Every method defaults to a no-op and none can fail,
/// so a hook can watch a run but never change how it ends.
#[async_trait]
pub trait AgentHook: Send + Sync {
    async fn before_model(&self, _messages: &[Message]) {}

    async fn after_model(&self, _raw_response: &str) {}

    async fn before_tool_call(&self, _name: &str, _input: Option<&str>) {}

    async fn after_tool_result(&self, _name: &str, _observation: &str) {}

    async fn on_correction(&self, _correction: &Correction) {}

    async fn on_outcome(&self, _outcome: &Outcome) {}
}
