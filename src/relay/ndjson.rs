//! NDJSON-to-SSE relay.
//!
//! Forwards `{model, prompt}` to the generation backend's `/api/generate`
//! endpoint and re-frames its newline-delimited JSON response stream as
//! SSE events. Validation and transport failures surface as in-stream
//! `event: error` frames; the HTTP status is already committed to 200 by
//! the time they can occur.

use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::config::BackendConfig;
use crate::relay::FRAME_CHANNEL_CAPACITY;
use crate::sse::SseFrame;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("backend request failed: {0}")]
    Backend(#[from] reqwest::Error),
}

/// Request body forwarded to the backend generation endpoint.
#[derive(Debug, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub context: Vec<i64>,
}

/// One decoded object from the backend's NDJSON stream.
///
/// Missing fields fall back to the same defaults the backend's clients
/// assume: empty fragment, not done, duration sentinel -1.
#[derive(Debug, Deserialize)]
pub struct UpstreamChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default = "sentinel_duration")]
    pub total_duration: i64,
}

fn sentinel_duration() -> i64 {
    -1
}

/// Payload carried on the relay's `data:` lines.
///
/// Field order is fixed so decoding and re-encoding an emitted payload
/// reproduces the original bytes. `total_duration` appears only on the
/// final (done) payload.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayResult {
    pub data: String,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<i64>,
}

/// Relay a generation request as a stream of SSE frame text.
///
/// An empty (after trimming) prompt short-circuits into a single error
/// frame without contacting the backend.
pub fn relay_stream(
    client: Client,
    backend: BackendConfig,
    model: String,
    prompt: String,
) -> ReceiverStream<String> {
    let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        if let Err(e) = run_relay(client, backend, model, prompt, &tx).await {
            warn!(error = %e, "relay terminated");
            let frame = SseFrame::new().event("error").data(e.to_string()).to_wire();
            let _ = tx.send(frame).await;
        }
    });

    ReceiverStream::new(rx)
}

async fn run_relay(
    client: Client,
    backend: BackendConfig,
    model: String,
    prompt: String,
    tx: &mpsc::Sender<String>,
) -> Result<(), RelayError> {
    if prompt.trim().is_empty() {
        let frame = SseFrame::new()
            .event("error")
            .data("Prompt cannot be empty.")
            .to_wire();
        let _ = tx.send(frame).await;
        return Ok(());
    }

    let body = GenerateRequest {
        model,
        prompt,
        stream: true,
        context: Vec::new(),
    };

    let response = client
        .post(format!("{}/api/generate", backend.base_url))
        .json(&body)
        .send()
        .await?;

    // Left open so it attaches to the first relayed frame, matching the
    // wire bytes of the endpoint this replaces.
    let start = SseFrame::new().event("start").to_wire_unterminated();
    if tx.send(start).await.is_err() {
        return Ok(());
    }

    let mut chunks = Box::pin(response.bytes_stream());
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        if chunk.is_empty() {
            continue;
        }

        // Assumes every chunk holds exactly one JSON object. An NDJSON
        // line split across chunks, or two lines sharing one chunk, will
        // fail to parse; carried over as a known limitation rather than
        // fixed with a line-buffering reader.
        let parsed: UpstreamChunk = match serde_json::from_slice(&chunk) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, bytes = chunk.len(), "undecodable chunk");
                let frame = SseFrame::new()
                    .event("error")
                    .data("Error decoding JSON")
                    .to_wire();
                if tx.send(frame).await.is_err() {
                    return Ok(());
                }
                continue;
            }
        };

        let mut result = RelayResult {
            data: parsed.response,
            done: parsed.done,
            total_duration: None,
        };
        debug!(done = result.done, fragment_len = result.data.len(), "relayed chunk");

        if !result.done {
            let json = serde_json::to_string(&result).unwrap_or_default();
            let frame = SseFrame::new().data(json).to_wire();
            if tx.send(frame).await.is_err() {
                return Ok(());
            }
            continue;
        }

        result.total_duration = Some(parsed.total_duration);
        let json = serde_json::to_string(&result).unwrap_or_default();
        let frame = SseFrame::new().event("done").data(json).to_wire();
        let _ = tx.send(frame).await;
        return Ok(());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_chunk_defaults() {
        let parsed: UpstreamChunk = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.response, "");
        assert!(!parsed.done);
        assert_eq!(parsed.total_duration, -1);
    }

    #[test]
    fn test_result_omits_duration_until_done() {
        let partial = RelayResult {
            data: "Hel".to_string(),
            done: false,
            total_duration: None,
        };
        assert_eq!(
            serde_json::to_string(&partial).unwrap(),
            r#"{"data":"Hel","done":false}"#
        );

        let fin = RelayResult {
            data: String::new(),
            done: true,
            total_duration: Some(123_456),
        };
        assert_eq!(
            serde_json::to_string(&fin).unwrap(),
            r#"{"data":"","done":true,"total_duration":123456}"#
        );
    }

    #[test]
    fn test_result_serialization_is_stable() {
        let original = r#"{"data":"lo","done":true,"total_duration":42}"#;
        let decoded: RelayResult = serde_json::from_str(original).unwrap();
        assert_eq!(serde_json::to_string(&decoded).unwrap(), original);
    }

    #[test]
    fn test_generate_request_body_shape() {
        let body = GenerateRequest {
            model: "deepseek-r1:14b".to_string(),
            prompt: "hello".to_string(),
            stream: true,
            context: Vec::new(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"model":"deepseek-r1:14b","prompt":"hello","stream":true,"context":[]}"#
        );
    }
}
