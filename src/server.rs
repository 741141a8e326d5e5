use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::agent::Agent;
use crate::error::{AgentError, Result};
use crate::llm::LanguageModel;

/// HTTP front end. Each request runs its own loop against the shared agent.
pub struct AgentServer<M: LanguageModel + 'static> {
    agent: Arc<Agent<M>>,
}

impl<M: LanguageModel + 'static> Clone for AgentServer<M> {
    fn clone(&self) -> Self {
        Self {
            agent: Arc::clone(&self.agent),
        }
    }
}

impl<M: LanguageModel + 'static> AgentServer<M> {
    pub fn new(agent: Agent<M>) -> Self {
        Self {
            agent: Arc::new(agent),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(index))
            .route("/health", get(|| async { "ok" }))
            .route("/chat", post(chat::<M>))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.clone())
    }

    /// Serves until ctrl-c.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "listening");
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|err| AgentError::Protocol(format!("server error: {err}")))?;
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatReply {
    response: String,
}

async fn chat<M: LanguageModel + 'static>(
    State(state): State<AgentServer<M>>,
    Json(req): Json<ChatRequest>,
) -> Response {
    let message = req.message.unwrap_or_default();
    info!(message = %message, "received message");
    if message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "No message provided"})),
        )
            .into_response();
    }

    // The loop never fails by itself; a panic is the only request-level fault left.
    let agent = Arc::clone(&state.agent);
    match tokio::spawn(async move { agent.respond(message).await }).await {
        Ok(response) => {
            info!(response = %response, "sending response");
            Json(ChatReply { response }).into_response()
        }
        Err(err) => {
            error!(error = %err, "agent task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "internal error"})),
            )
                .into_response()
        }
    }
}

async fn index() -> Html<&'static str> {
    Html(
        r#"
<!doctype html>
<html>
<head>
    <meta charset="utf-8" />
    <title>ReAct Agent</title>
    <style>
        body { font-family: sans-serif; margin: 2rem auto; max-width: 720px; }
        #log { border: 1px solid #ccc; border-radius: 8px; padding: 1rem; height: 420px; overflow: auto; }
        .user { color: #1a4d8f; margin: 0.5rem 0; }
        .agent { color: #222; margin: 0.5rem 0; white-space: pre-wrap; }
        form { display: flex; gap: 0.5rem; margin-top: 1rem; }
        input { flex: 1; padding: 0.5rem; }
    </style>
</head>
<body>
    <h1>ReAct Agent</h1>
    <p>What can I help you with: Calculate, Time, Get weather, or Wikipedia.</p>
    <div id="log"></div>
    <form id="chat">
        <input id="message" autocomplete="off" placeholder="Ask something..." />
        <button type="submit">Send</button>
    </form>
    <script>
        const log = document.getElementById('log');
        function append(cls, text) {
            const node = document.createElement('div');
            node.className = cls;
            node.innerText = text;
            log.appendChild(node);
            log.scrollTop = log.scrollHeight;
        }
        document.getElementById('chat').addEventListener('submit', async (ev) => {
            ev.preventDefault();
            const input = document.getElementById('message');
            const message = input.value.trim();
            if (!message) return;
            input.value = '';
            append('user', message);
            const reply = await fetch('/chat', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ message }),
            }).then(r => r.json());
            append('agent', reply.response ?? ('Error: ' + reply.error));
        });
    </script>
</body>
</html>
"#,
    )
}
