//! Decoding of a single assistant turn into an [`AgentResponse`].
//!
//! The model is instructed to answer with one JSON object:
//!
//! ```json
//! {"thought": "...", "action": "tool_name", "action_input": "..."}
//! {"thought": "...", "action": null, "action_input": null, "final_answer": "..."}
//! ```
//!
//! Decoding is strict about the text being JSON and lenient about the object shape:
//! absent keys fall back to their defaults, unknown keys are ignored, and mistyped
//! values are coerced rather than rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Structured content of one assistant reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Free-form reasoning. Anything but a string reads as empty.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub thought: String,
    /// Tool to invoke. `None` means the model wants to finish; non-string values are
    /// rendered to text and will not match any tool name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub action: Option<String>,
    /// Tool input. Scalars and structured values are rendered to text.
    #[serde(default, deserialize_with = "lenient_text")]
    pub action_input: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub final_answer: Option<String>,
}

impl AgentResponse {
    /// True when the reply asks to end the loop. An action, when present, always wins
    /// over a final answer given in the same reply.
    pub fn is_final(&self) -> bool {
        self.action.is_none()
    }

    /// The final answer, if one was given and it is not empty.
    pub fn answer(&self) -> Option<&str> {
        self.final_answer
            .as_deref()
            .filter(|answer| !answer.is_empty())
    }
}

/// Why a reply could not be turned into an [`AgentResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The text is not JSON at all. Only this kind counts against the error budget.
    #[error("reply is not valid JSON: {diagnostic}")]
    InvalidJson { raw: String, diagnostic: String },

    /// The text is JSON but not an object.
    #[error("reply has an unexpected shape: {diagnostic}")]
    UnexpectedShape { raw: String, diagnostic: String },
}

impl ParseError {
    pub fn is_invalid_json(&self) -> bool {
        matches!(self, ParseError::InvalidJson { .. })
    }

    pub fn raw(&self) -> &str {
        match self {
            ParseError::InvalidJson { raw, .. } | ParseError::UnexpectedShape { raw, .. } => raw,
        }
    }

    pub fn diagnostic(&self) -> &str {
        match self {
            ParseError::InvalidJson { diagnostic, .. }
            | ParseError::UnexpectedShape { diagnostic, .. } => diagnostic,
        }
    }
}

/// Decodes one raw model reply.
///
/// A failure is an ordinary value for the caller to act on; it never panics.
pub fn parse_response(raw: &str) -> Result<AgentResponse, ParseError> {
    let value: Value = serde_json::from_str(raw).map_err(|err| ParseError::InvalidJson {
        raw: raw.to_string(),
        diagnostic: err.to_string(),
    })?;

    if !value.is_object() {
        return Err(ParseError::UnexpectedShape {
            raw: raw.to_string(),
            diagnostic: format!("expected a JSON object, found {}", json_kind(&value)),
        });
    }

    serde_json::from_value(value).map_err(|err| ParseError::UnexpectedShape {
        raw: raw.to_string(),
        diagnostic: err.to_string(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => text,
        _ => String::new(),
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}
