//! HTTP surface of the relay.
//!
//! Implements the streaming endpoints:
//! - POST /sse — character-by-character streaming
//! - POST /sse/framed — character streaming bracketed by marker frames
//! - POST /ndjson — NDJSON-to-SSE relay against the generation backend
//! - GET /health — liveness
//!
//! Streaming responses are written as a raw `text/event-stream` body
//! rather than through axum's `Sse` type, which cannot express the
//! unterminated marker groups the wire format requires.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::relay::chars::{bracketed_char_stream, char_stream};
use crate::relay::ndjson::relay_stream;

/// Application state shared across handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub client: reqwest::Client,
    pub start_time: Instant,
}

/// Build the axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/sse", post(stream_chars))
        .route("/sse/framed", post(stream_chars_framed))
        .route("/ndjson", post(relay_ndjson))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─── Request/Response Types ────────────────────────────────────────────────

/// Body of the character-streaming endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharStreamRequest {
    pub content: String,

    /// Seconds to sleep between emitted frames.
    pub delay_time: f64,
}

/// Body of the NDJSON relay endpoint.
#[derive(Debug, Deserialize)]
pub struct NdjsonRelayRequest {
    pub model: String,
    pub prompt: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn stream_chars(
    State(_state): State<Arc<AppState>>,
    Json(req): Json<CharStreamRequest>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    info!(
        request_id = %request_id,
        chars = req.content.chars().count(),
        delay_secs = req.delay_time,
        "Character stream request"
    );

    event_stream_response(char_stream(req.content, frame_delay(req.delay_time)))
}

async fn stream_chars_framed(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CharStreamRequest>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    info!(
        request_id = %request_id,
        chars = req.content.chars().count(),
        delay_secs = req.delay_time,
        "Bracketed character stream request"
    );

    event_stream_response(bracketed_char_stream(
        req.content,
        frame_delay(req.delay_time),
        state.config.stream.clone(),
    ))
}

async fn relay_ndjson(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NdjsonRelayRequest>,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    info!(
        request_id = %request_id,
        model = %req.model,
        prompt_len = req.prompt.len(),
        "NDJSON relay request"
    );

    event_stream_response(relay_stream(
        state.client.clone(),
        state.config.backend.clone(),
        req.model,
        req.prompt,
    ))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

// ─── Helpers ───────────────────────────────────────────────────────────────

/// Clamp the client-supplied delay to a valid duration. Negative and NaN
/// values become zero.
fn frame_delay(delay_secs: f64) -> Duration {
    Duration::try_from_secs_f64(delay_secs.max(0.0)).unwrap_or(Duration::ZERO)
}

/// Wrap a frame stream in a committed `text/event-stream` response.
fn event_stream_response(frames: ReceiverStream<String>) -> Response {
    let body = Body::from_stream(frames.map(Ok::<_, Infallible>));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_delay_clamps_invalid_input() {
        assert_eq!(frame_delay(-1.0), Duration::ZERO);
        assert_eq!(frame_delay(f64::NAN), Duration::ZERO);
        assert_eq!(frame_delay(0.5), Duration::from_millis(500));
    }

    #[test]
    fn test_char_stream_request_uses_camel_case() {
        let req: CharStreamRequest =
            serde_json::from_str(r#"{"content": "hi", "delayTime": 0.1}"#).unwrap();
        assert_eq!(req.content, "hi");
        assert_eq!(req.delay_time, 0.1);
    }
}
