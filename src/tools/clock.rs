//! Wall-clock tool.

use async_trait::async_trait;
use chrono::Local;

use crate::tool::{Tool, ToolArity};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct TimeTool;

#[async_trait]
impl Tool for TimeTool {
    fn name(&self) -> &str {
        "time"
    }

    fn description(&self) -> &str {
        "Get current date and time. Input: null"
    }

    fn arity(&self) -> ToolArity {
        ToolArity::None
    }

    async fn call(&self, _input: Option<&str>) -> String {
        format!(
            "Current date and time: {}",
            Local::now().format(TIMESTAMP_FORMAT)
        )
    }
}
