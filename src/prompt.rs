//! System instruction sent as the first message of every conversation.

use crate::tool::{ToolArity, ToolRegistry};

/// Builds the instruction describing the JSON-only reply contract and the tools
/// available in `tools`.
pub fn build_system_prompt(tools: &ToolRegistry) -> String {
    let names = tools.names();
    let mut prompt = String::new();

    if names.is_empty() {
        prompt.push_str("You are a helpful AI assistant. No tools are available.\n\n");
    } else {
        prompt.push_str(&format!(
            "You are a helpful AI assistant with access to exactly {} tools: {}.\n\n",
            names.len(),
            join_with_and(&names)
        ));
    }

    prompt.push_str(
        "You MUST ALWAYS respond in valid JSON format. No other text outside the JSON is allowed.\n\n",
    );
    if !names.is_empty() {
        prompt.push_str("When you need to use a tool, respond with:\n");
        prompt.push_str(
            "{\"thought\": \"your reasoning\", \"action\": \"tool_name\", \"action_input\": \"input for tool\"}\n\n",
        );
    }
    prompt.push_str("When you have the final answer, respond with:\n");
    prompt.push_str(
        "{\"thought\": \"I now have the final answer\", \"action\": null, \"action_input\": null, \"final_answer\": \"your answer to the user\"}\n\n",
    );

    if !names.is_empty() {
        prompt.push_str("Available tools:\n");
        for (index, tool) in tools.describe().iter().enumerate() {
            prompt.push_str(&format!("{}. {} - {}", index + 1, tool.name, tool.description));
            if tool.arity == ToolArity::None && !tool.description.contains("Input:") {
                prompt.push_str(" Input: null");
            }
            prompt.push('\n');
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "IMPORTANT: Your response must be ONLY valid JSON. Start with { and end with }.",
    );
    prompt
}

fn join_with_and(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {}", init.join(", "), last),
    }
}
