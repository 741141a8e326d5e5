//! The ReAct loop: ask the model, interpret its JSON, run a tool or correct it,
//! repeat until an answer or a bound is reached.
//!
//! Transitions:
//!
//! | state            | event                                  | next                          |
//! |------------------|----------------------------------------|-------------------------------|
//! | `AwaitingModel`  | iteration budget spent                 | `Terminated(IterationLimit)`  |
//! | `AwaitingModel`  | model call fails                       | `Terminated(ModelUnavailable)`|
//! | `AwaitingModel`  | model replies                          | `Interpreting`                |
//! | `Interpreting`   | reply is not JSON, error budget spent  | `Terminated(MalformedBudget…)`|
//! | `Interpreting`   | reply is not JSON                      | `CorrectiveRetry`             |
//! | `Interpreting`   | JSON that is not an object             | `CorrectiveRetry`             |
//! | `Interpreting`   | `action` is null                       | `Terminated(Answer/NoAnswer)` |
//! | `Interpreting`   | `action` is not a registered tool      | `CorrectiveRetry`             |
//! | `Interpreting`   | `action` is a registered tool          | `DispatchTool`                |
//! | `DispatchTool`   | observation appended                   | `AwaitingModel`               |
//! | `CorrectiveRetry`| guidance appended                      | `AwaitingModel`               |

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::hooks::AgentHook;
use crate::llm::LanguageModel;
use crate::memory::ConversationMemory;
use crate::message::Message;
use crate::metrics::{MetricsTracker, RunGuard};
use crate::prompt::build_system_prompt;
use crate::response::{parse_response, ParseError};
use crate::tool::ToolRegistry;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_MAX_ERRORS: usize = 2;

pub const NO_ANSWER_MESSAGE: &str = "I couldn't determine an answer.";
pub const APOLOGY_MESSAGE: &str =
    "I apologize, but I'm having trouble processing your request. Please try rephrasing your question.";
pub const MODEL_UNAVAILABLE_MESSAGE: &str =
    "An error occurred while contacting the language model. Please try again later.";
pub const ITERATION_LIMIT_MESSAGE: &str =
    "Maximum iterations reached. Please try a simpler question.";

/// How a query ended. Every variant maps to a user-facing string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Answer(String),
    /// The model finished without a usable `final_answer`.
    NoAnswer,
    MalformedBudgetExhausted,
    /// Carries the diagnostic for logs; it is not shown to the user.
    ModelUnavailable(String),
    IterationLimit,
}

impl Outcome {
    pub fn message(&self) -> String {
        match self {
            Outcome::Answer(answer) => answer.clone(),
            Outcome::NoAnswer => NO_ANSWER_MESSAGE.to_string(),
            Outcome::MalformedBudgetExhausted => APOLOGY_MESSAGE.to_string(),
            Outcome::ModelUnavailable(_) => MODEL_UNAVAILABLE_MESSAGE.to_string(),
            Outcome::IterationLimit => ITERATION_LIMIT_MESSAGE.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Answer(_) => "answer",
            Outcome::NoAnswer => "no_answer",
            Outcome::MalformedBudgetExhausted => "malformed_budget_exhausted",
            Outcome::ModelUnavailable(_) => "model_unavailable",
            Outcome::IterationLimit => "iteration_limit",
        }
    }

    /// The model chose to stop on its own.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Answer(_) | Outcome::NoAnswer)
    }
}

/// Reason a synthetic user message was injected to steer the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    Malformed(ParseError),
    UnknownTool(String),
}

/// Result of one query: the outcome plus the full transcript that produced it.
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub outcome: Outcome,
    pub transcript: ConversationMemory,
    pub llm_calls: usize,
}

#[derive(Debug)]
enum LoopState {
    AwaitingModel,
    Interpreting {
        raw: String,
    },
    DispatchTool {
        raw: String,
        name: String,
        input: Option<String>,
    },
    CorrectiveRetry {
        raw: String,
        correction: Correction,
    },
    Terminated(Outcome),
}

/// Mutable state of a single query. Never shared between queries.
struct RunState {
    memory: ConversationMemory,
    iteration: usize,
    error_count: usize,
    guard: Option<RunGuard>,
}

/// A ReAct agent that alternates between the LLM and registered tools.
///
/// The agent itself is immutable while running, so one instance can serve any number
/// of concurrent queries; each call to [`Agent::run`] owns its own history.
pub struct Agent<M: LanguageModel> {
    model: Arc<M>,
    tools: ToolRegistry,
    system_prompt: Option<String>,
    max_iterations: usize,
    max_errors: usize,
    hooks: Vec<Arc<dyn AgentHook>>,
    metrics: Option<MetricsTracker>,
}

impl<M: LanguageModel> Agent<M> {
    pub fn new(model: Arc<M>) -> Self {
        Self {
            model,
            tools: ToolRegistry::new(),
            system_prompt: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_errors: DEFAULT_MAX_ERRORS,
            hooks: Vec::new(),
            metrics: None,
        }
    }

    /// Replaces the prompt generated from the tool registry.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = max_errors.max(1);
        self
    }

    pub fn with_config(self, config: &AgentConfig) -> Self {
        self.with_max_iterations(config.max_iterations)
            .with_max_errors(config.max_errors)
    }

    pub fn with_hook(mut self, hook: Arc<dyn AgentHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsTracker) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn max_errors(&self) -> usize {
        self.max_errors
    }

    pub fn system_prompt(&self) -> String {
        self.system_prompt
            .clone()
            .unwrap_or_else(|| build_system_prompt(&self.tools))
    }

    /// Answers `query`, always with a string. Failures are reported in the text.
    pub async fn respond(&self, query: impl Into<String>) -> String {
        self.run(query).await.outcome.message()
    }

    /// Drives one query to a terminal state.
    pub async fn run(&self, query: impl Into<String>) -> AgentRun {
        let mut run = RunState {
            memory: ConversationMemory::seeded(self.system_prompt(), query),
            iteration: 0,
            error_count: 0,
            guard: self.metrics.as_ref().map(MetricsTracker::start_run),
        };

        let mut state = LoopState::AwaitingModel;
        let outcome = loop {
            state = match state {
                LoopState::Terminated(outcome) => break outcome,
                LoopState::AwaitingModel => self.await_model(&mut run).await,
                LoopState::Interpreting { raw } => self.interpret(&mut run, raw),
                LoopState::DispatchTool { raw, name, input } => {
                    self.dispatch_tool(&mut run, raw, name, input).await
                }
                LoopState::CorrectiveRetry { raw, correction } => {
                    self.correct(&mut run, raw, correction).await
                }
            };
        };

        info!(
            outcome = outcome.kind(),
            llm_calls = run.iteration,
            messages = run.memory.len(),
            "agent run finished"
        );
        for hook in &self.hooks {
            hook.on_outcome(&outcome).await;
        }
        if let Some(guard) = run.guard.take() {
            guard.finish(&outcome);
        }

        AgentRun {
            outcome,
            transcript: run.memory,
            llm_calls: run.iteration,
        }
    }

    async fn await_model(&self, run: &mut RunState) -> LoopState {
        if run.iteration >= self.max_iterations {
            warn!(max_iterations = self.max_iterations, "iteration budget exhausted");
            return LoopState::Terminated(Outcome::IterationLimit);
        }
        run.iteration += 1;
        debug!(iteration = run.iteration, "requesting completion");

        for hook in &self.hooks {
            hook.before_model(run.memory.messages()).await;
        }
        if let Some(guard) = run.guard.as_mut() {
            guard.record_llm_call();
        }

        match self.model.complete(run.memory.messages()).await {
            Ok(raw) => {
                for hook in &self.hooks {
                    hook.after_model(&raw).await;
                }
                LoopState::Interpreting { raw }
            }
            Err(err) => {
                error!(iteration = run.iteration, error = %err, "language model call failed");
                LoopState::Terminated(Outcome::ModelUnavailable(err.to_string()))
            }
        }
    }

    fn interpret(&self, run: &mut RunState, raw: String) -> LoopState {
        let response = match parse_response(&raw) {
            Ok(response) => response,
            Err(err) if err.is_invalid_json() => {
                run.error_count += 1;
                warn!(
                    error_count = run.error_count,
                    max_errors = self.max_errors,
                    error = %err,
                    "model reply was malformed"
                );
                if run.error_count >= self.max_errors {
                    return LoopState::Terminated(Outcome::MalformedBudgetExhausted);
                }
                return LoopState::CorrectiveRetry {
                    raw,
                    correction: Correction::Malformed(err),
                };
            }
            // Decodable JSON of the wrong shape is steered like an unknown tool.
            Err(err) => {
                run.error_count = 0;
                warn!(error = %err, "model reply was not a JSON object");
                return LoopState::CorrectiveRetry {
                    raw,
                    correction: Correction::Malformed(err),
                };
            }
        };
        run.error_count = 0;
        debug!(thought = %response.thought, action = ?response.action, "model reply parsed");

        let answer = response.answer().map(str::to_owned);
        match response.action {
            None => LoopState::Terminated(answer.map_or(Outcome::NoAnswer, Outcome::Answer)),
            Some(name) if !self.tools.contains(&name) => LoopState::CorrectiveRetry {
                raw,
                correction: Correction::UnknownTool(name),
            },
            Some(name) => LoopState::DispatchTool {
                raw,
                name,
                input: response.action_input,
            },
        }
    }

    async fn dispatch_tool(
        &self,
        run: &mut RunState,
        raw: String,
        name: String,
        input: Option<String>,
    ) -> LoopState {
        for hook in &self.hooks {
            hook.before_tool_call(&name, input.as_deref()).await;
        }
        if let Some(guard) = run.guard.as_mut() {
            guard.record_tool_call();
        }

        // `interpret` already checked the name against this registry, which never
        // changes while the agent exists.
        let observation = match self.tools.dispatch(&name, input.as_deref()).await {
            Ok(observation) => observation,
            Err(AgentError::ToolNotFound(name)) => {
                return LoopState::CorrectiveRetry {
                    raw,
                    correction: Correction::UnknownTool(name),
                }
            }
            Err(err) => {
                warn!(tool = %name, error = %err, "tool dispatch failed");
                format!("Error: {err}")
            }
        };
        debug!(tool = %name, observation = %observation, "tool returned");

        for hook in &self.hooks {
            hook.after_tool_result(&name, &observation).await;
        }
        run.memory.push(Message::assistant(raw));
        run.memory
            .push(Message::user(format!("Observation: {observation}")));
        LoopState::AwaitingModel
    }

    async fn correct(&self, run: &mut RunState, raw: String, correction: Correction) -> LoopState {
        for hook in &self.hooks {
            hook.on_correction(&correction).await;
        }
        if let Some(guard) = run.guard.as_mut() {
            guard.record_correction();
        }

        let guidance = match &correction {
            Correction::Malformed(err) if err.is_invalid_json() => format!(
                "Error: Your response was not valid JSON. Please respond with ONLY valid JSON in the exact format specified. Error details: {}",
                err.diagnostic()
            ),
            Correction::Malformed(err) => format!(
                "Error: Your response must be a single JSON object in the exact format specified. Error details: {}",
                err.diagnostic()
            ),
            Correction::UnknownTool(name) => {
                warn!(tool = %name, "model requested an unknown tool");
                format!(
                    "Error: Unknown tool '{name}'. Available tools are: {}",
                    self.tools.names().join(", ")
                )
            }
        };
        run.memory.push(Message::assistant(raw));
        run.memory.push(Message::user(guidance));
        LoopState::AwaitingModel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::message::Role;
    use crate::tool::{Tool, ToolArity};
    use crate::StubModel;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes the input back"
        }

        async fn call(&self, input: Option<&str>) -> String {
            format!("echo: {}", input.unwrap_or_default())
        }
    }

    struct NoonTool;

    #[async_trait]
    impl Tool for NoonTool {
        fn name(&self) -> &str {
            "noon"
        }

        fn description(&self) -> &str {
            "Always reports noon"
        }

        fn arity(&self) -> ToolArity {
            ToolArity::None
        }

        async fn call(&self, input: Option<&str>) -> String {
            assert!(input.is_none());
            "12:00".into()
        }
    }

    fn tools() -> ToolRegistry {
        let mut tools = ToolRegistry::new();
        tools.register(EchoTool);
        tools.register(NoonTool);
        tools
    }

    #[tokio::test]
    async fn returns_final_answer_without_tools() {
        let model = StubModel::new(vec![
            r#"{"thought":"easy","action":null,"final_answer":"Hello!"}"#.into(),
        ]);
        let agent = Agent::new(model.clone()).with_tools(tools());

        let run = agent.run("hi").await;

        assert_eq!(run.outcome, Outcome::Answer("Hello!".into()));
        assert_eq!(run.llm_calls, 1);
        assert_eq!(run.transcript.len(), 2);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn executes_tool_then_replies() {
        let call = r#"{"thought":"echo it","action":"echo","action_input":"ping"}"#;
        let model = StubModel::new(vec![
            call.into(),
            r#"{"action":null,"final_answer":"ping"}"#.into(),
        ]);
        let agent = Agent::new(model.clone()).with_tools(tools());

        let run = agent.run("say ping").await;

        assert_eq!(run.outcome.message(), "ping");
        let messages = run.transcript.messages();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2], Message::assistant(call));
        assert_eq!(messages[3], Message::user("Observation: echo: ping"));
        assert_eq!(model.transcripts()[1].len(), 4);
    }

    #[tokio::test]
    async fn inputless_tools_never_see_the_input() {
        let model = StubModel::new(vec![
            r#"{"action":"noon","action_input":"what time?"}"#.into(),
            r#"{"action":null,"final_answer":"noon"}"#.into(),
        ]);
        let agent = Agent::new(model).with_tools(tools());

        let run = agent.run("time?").await;

        assert_eq!(run.transcript.messages()[3].content, "Observation: 12:00");
    }

    #[tokio::test]
    async fn successful_parse_resets_error_budget() {
        let model = StubModel::new(vec![
            "not json".into(),
            r#"{"action":"echo","action_input":"a"}"#.into(),
            "still not json".into(),
            r#"{"action":null,"final_answer":"recovered"}"#.into(),
        ]);
        let agent = Agent::new(model.clone()).with_tools(tools());

        let run = agent.run("q").await;

        assert_eq!(run.outcome, Outcome::Answer("recovered".into()));
        assert_eq!(model.calls(), 4);
    }

    #[tokio::test]
    async fn unknown_tools_do_not_consume_error_budget() {
        let bogus = r#"{"action":"bogus","action_input":"x"}"#;
        let model = StubModel::new(vec![
            "oops".into(),
            bogus.into(),
            bogus.into(),
            r#"{"action":null,"final_answer":"done"}"#.into(),
        ]);
        let agent = Agent::new(model).with_tools(tools());

        let run = agent.run("q").await;

        assert_eq!(run.outcome, Outcome::Answer("done".into()));
        let guidance = &run.transcript.messages()[5];
        assert_eq!(guidance.role, Role::User);
        assert_eq!(
            guidance.content,
            "Error: Unknown tool 'bogus'. Available tools are: echo, noon"
        );
    }

    #[tokio::test]
    async fn non_object_json_is_corrected_without_spending_budget() {
        let model = StubModel::new(vec![
            "not json".into(),
            r#"["echo"]"#.into(),
            "\"just a string\"".into(),
            r#"{"action":null,"final_answer":"done"}"#.into(),
        ]);
        let agent = Agent::new(model.clone()).with_tools(tools());

        let run = agent.run("q").await;

        assert_eq!(run.outcome, Outcome::Answer("done".into()));
        assert_eq!(model.calls(), 4);
        assert!(run.transcript.messages()[5]
            .content
            .starts_with("Error: Your response must be a single JSON object"));
    }

    #[tokio::test]
    async fn model_failure_ends_the_query() {
        let agent = Agent::new(StubModel::new(Vec::new())).with_tools(tools());

        let run = agent.run("q").await;

        assert!(matches!(run.outcome, Outcome::ModelUnavailable(_)));
        assert_eq!(run.outcome.message(), MODEL_UNAVAILABLE_MESSAGE);
        assert_eq!(run.transcript.len(), 2);
    }

    #[tokio::test]
    async fn custom_limits_are_honoured() {
        let model = StubModel::repeating(r#"{"action":"echo","action_input":"x"}"#, 5);
        let agent = Agent::new(model.clone())
            .with_tools(tools())
            .with_max_iterations(3);

        assert_eq!(agent.respond("q").await, ITERATION_LIMIT_MESSAGE);
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn records_metrics_per_run() {
        let metrics = MetricsTracker::default();
        let model = StubModel::new(vec![
            "garbage".into(),
            r#"{"action":"echo","action_input":"x"}"#.into(),
            r#"{"action":null,"final_answer":"ok"}"#.into(),
        ]);
        let agent = Agent::new(model)
            .with_tools(tools())
            .with_metrics(metrics.clone());

        agent.run("q").await;

        let reports = metrics.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].llm_calls, 3);
        assert_eq!(reports[0].tool_calls, 1);
        assert_eq!(reports[0].corrections, 1);
        assert!(reports[0].success);
    }

    #[test]
    fn limits_never_drop_below_one() {
        let agent = Agent::new(StubModel::new(Vec::new()))
            .with_max_iterations(0)
            .with_max_errors(0);
        assert_eq!(agent.max_iterations(), 1);
        assert_eq!(agent.max_errors(), 1);
    }

    #[test]
    fn explicit_prompt_overrides_generated_one() {
        let agent = Agent::new(StubModel::new(Vec::new())).with_tools(tools());
        assert!(agent.system_prompt().contains("1. echo - Echoes the input back"));

        let agent = agent.with_system_prompt("custom");
        assert_eq!(agent.system_prompt(), "custom");
    }
}
