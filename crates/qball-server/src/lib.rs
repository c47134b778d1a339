//! HTTP front end for the quantum Magic 8-Ball.
//!
//! `GET /` renders a page with one answer; `GET /api/v1/answer` returns the
//! same as JSON. Sampling blocks, so it runs on tokio's blocking pool.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::get,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use qball_core::{Answer, EightBall, SampleMode, SamplerError};

/// Shared server state.
struct AppState {
    ball: Arc<EightBall>,
    allow_remote: bool,
}

#[derive(Deserialize)]
struct AnswerParams {
    /// Sampling mode: local (default) or remote.
    mode: Option<String>,
}

#[derive(Debug, Serialize)]
struct AnswerResponse {
    success: bool,
    mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    /// Error message if the request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    range: u64,
    bit_width: u32,
    remote_configured: bool,
    remote_allowed: bool,
}

/// Pick the mode for a request. Remote is only honoured when the server allows it.
fn resolve_mode(requested: Option<&str>, allow_remote: bool) -> Result<SampleMode, SamplerError> {
    let mode: SampleMode = match requested {
        Some(m) => m.parse()?,
        None => SampleMode::Local,
    };
    if mode == SampleMode::Remote && !allow_remote {
        warn!("remote mode requested but not enabled; answering locally");
        return Ok(SampleMode::Local);
    }
    Ok(mode)
}

async fn ask(state: &AppState, mode: SampleMode) -> Result<Answer, String> {
    let ball = Arc::clone(&state.ball);
    tokio::task::spawn_blocking(move || ball.ask(mode))
        .await
        .map_err(|e| format!("sampling task failed: {e}"))?
        .map_err(|e| e.to_string())
}

async fn handle_answer(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnswerParams>,
) -> (StatusCode, Json<AnswerResponse>) {
    let mode = match resolve_mode(params.mode.as_deref(), state.allow_remote) {
        Ok(mode) => mode,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(AnswerResponse {
                    success: false,
                    mode: params.mode.unwrap_or_default(),
                    index: None,
                    answer: None,
                    error: Some(e.to_string()),
                }),
            );
        }
    };

    match ask(&state, mode).await {
        Ok(answer) => (
            StatusCode::OK,
            Json(AnswerResponse {
                success: true,
                mode: mode.to_string(),
                index: Some(answer.index),
                answer: Some(answer.text.to_string()),
                error: None,
            }),
        ),
        Err(e) => {
            warn!("{mode} answer failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(AnswerResponse {
                    success: false,
                    mode: mode.to_string(),
                    index: None,
                    answer: None,
                    error: Some(e),
                }),
            )
        }
    }
}

async fn handle_page(State(state): State<Arc<AppState>>) -> (StatusCode, Html<String>) {
    match ask(&state, SampleMode::Local).await {
        Ok(answer) => (StatusCode::OK, Html(render_page(answer.text))),
        Err(e) => {
            warn!("page answer failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Html(render_page("The qubits are not answering right now. Try again.")),
            )
        }
    }
}

async fn handle_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let sampler = state.ball.sampler();
    Json(HealthResponse {
        status: "ok".to_string(),
        range: sampler.range(),
        bit_width: sampler.bit_width(),
        remote_configured: sampler.has_remote(),
        remote_allowed: state.allow_remote,
    })
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let modes = if state.allow_remote {
        "local (default), remote"
    } else {
        "local"
    };
    Json(serde_json::json!({
        "name": "qball server",
        "version": qball_core::VERSION,
        "endpoints": {
            "/": "HTML page with one answer",
            "/api": "This API index",
            "/api/v1/answer": {
                "method": "GET",
                "description": "Ask the Magic 8-Ball",
                "params": {
                    "mode": format!("Sampling mode: {modes}"),
                }
            },
            "/health": "Sampler configuration and health",
        },
    }))
}

fn render_page(answer: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Quantum Magic 8-Ball</title>\n</head>\n<body>\n\
         <h1>Quantum Magic 8-Ball</h1>\n<p class=\"answer\">{}</p>\n\
         <p><a href=\"/\">Ask again</a></p>\n</body>\n</html>\n",
        html::escape(answer)
    )
}

/// Build the axum router.
pub fn build_router(ball: Arc<EightBall>, allow_remote: bool) -> Router {
    let state = Arc::new(AppState { ball, allow_remote });

    Router::new()
        .route("/", get(handle_page))
        .route("/api", get(handle_index))
        .route("/api/v1/answer", get(handle_answer))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Run the HTTP server until it fails.
///
/// The caller keeps its own handle on `ball` so a remote client is never
/// dropped from inside the runtime.
pub async fn run_server(
    ball: Arc<EightBall>,
    host: &str,
    port: u16,
    allow_remote: bool,
) -> std::io::Result<()> {
    let app = build_router(ball, allow_remote);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await
}

// Minimal HTML escaping for answer text
mod html {
    pub fn escape(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' => out.push_str("&lt;"),
                '>' => out.push_str("&gt;"),
                '"' => out.push_str("&quot;"),
                '\'' => out.push_str("&#39;"),
                _ => out.push(c),
            }
        }
        out
    }
}
