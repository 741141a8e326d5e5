//! Chat-completion clients used by the agent loop.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::error::{AgentError, Result};
use crate::message::Message;

pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Minimal abstraction around a chat completion provider.
///
/// Implementations return the raw assistant text. Every failure, whatever its cause,
/// is reported as [`AgentError::LanguageModel`] and no retries are attempted.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

fn coalesce_error(status: reqwest::StatusCode, body: &str) -> AgentError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return AgentError::LanguageModel(format!("openrouter rate limit exceeded: {body}"));
    }
    AgentError::LanguageModel(format!("openrouter request failed with {status}: {body}"))
}

/// OpenAI-compatible client for the OpenRouter chat completions endpoint.
#[derive(Clone)]
pub struct OpenRouterClient {
    http: reqwest::Client,
    model: String,
    api_key: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for OpenRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::build(
            Some(api_key.into()),
            DEFAULT_MODEL.to_string(),
            DEFAULT_BASE_URL.to_string(),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Builds a client from configuration. A missing key is not an error here:
    /// the first call reports the model as unavailable instead.
    pub fn from_config(cfg: &ModelConfig) -> Result<Self> {
        Self::build(
            cfg.api_key.clone(),
            cfg.model.clone(),
            cfg.base_url.clone(),
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    fn build(
        api_key: Option<String>,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|err| AgentError::LanguageModel(format!("http client error: {err}")))?,
            model,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl LanguageModel for OpenRouterClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AgentError::LanguageModel("missing OpenRouter API key".into())
        })?;

        let payload = ChatRequest {
            model: &self.model,
            messages,
        };

        let resp = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| AgentError::LanguageModel(format!("openrouter request error: {err}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(coalesce_error(status, &body));
        }

        let body: ChatResponse = resp.json().await.map_err(|err| {
            AgentError::LanguageModel(format!("openrouter response parse error: {err}"))
        })?;

        let first = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::LanguageModel("openrouter returned no choices".into()))?;

        first
            .message
            .content
            .ok_or_else(|| AgentError::LanguageModel("openrouter returned empty content".into()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// A deterministic model used for tests and demos.
///
/// Replies are handed out in order; once the script runs dry the model behaves as
/// if the remote service were unreachable.
#[derive(Debug, Default)]
pub struct StubModel {
    responses: Mutex<VecDeque<String>>,
    transcripts: Mutex<Vec<Vec<Message>>>,
}

impl StubModel {
    pub fn new(responses: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            transcripts: Mutex::new(Vec::new()),
        })
    }

    pub fn repeating(response: impl Into<String>, times: usize) -> Arc<Self> {
        let response = response.into();
        Self::new(vec![response; times])
    }

    /// Number of completions requested so far, including failed ones.
    pub fn calls(&self) -> usize {
        lock(&self.transcripts).len()
    }

    /// Every history the model was shown, one entry per call.
    pub fn transcripts(&self) -> Vec<Vec<Message>> {
        lock(&self.transcripts).clone()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        lock(&self.transcripts).push(messages.to_vec());
        lock(&self.responses).pop_front().ok_or_else(|| {
            AgentError::LanguageModel("StubModel ran out of scripted responses".into())
        })
    }
}
