//! Character-by-character SSE streaming.
//!
//! Emits one `data:` frame per character of the request content, pacing
//! frames with a per-task sleep so a slow stream only suspends its own
//! request. A spawned producer feeds an mpsc channel and the HTTP body
//! drains the receiver; when the client disconnects, the channel closes
//! and the producer stops.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::config::StreamConfig;
use crate::relay::FRAME_CHANNEL_CAPACITY;
use crate::sse::SseFrame;

/// Stream `content` as one data frame per character.
///
/// Empty content produces a stream that ends without emitting anything.
pub fn char_stream(content: String, delay: Duration) -> ReceiverStream<String> {
    let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        for ch in content.chars() {
            let frame = SseFrame::new().data(ch.to_string()).to_wire();
            if tx.send(frame).await.is_err() {
                debug!("client disconnected, stopping character stream");
                return;
            }
            sleep(delay).await;
        }
    });

    ReceiverStream::new(rx)
}

/// Stream `content` bracketed by open/done marker frames.
///
/// The opening group (`id`, `retry`, `event: open`) is emitted without a
/// terminating blank line, so it attaches to the first data frame on the
/// wire; the closing frame carries the done marker id. Both brackets are
/// emitted unconditionally, including around empty content.
pub fn bracketed_char_stream(
    content: String,
    delay: Duration,
    markers: StreamConfig,
) -> ReceiverStream<String> {
    let (tx, rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let open = SseFrame::new()
            .id(markers.open_marker_id.to_string())
            .retry_ms(markers.retry_ms)
            .event("open")
            .to_wire_unterminated();
        if tx.send(open).await.is_err() {
            return;
        }

        for ch in content.chars() {
            let frame = SseFrame::new().data(ch.to_string()).to_wire();
            if tx.send(frame).await.is_err() {
                debug!("client disconnected, stopping character stream");
                return;
            }
            sleep(delay).await;
        }

        let done = SseFrame::new()
            .id(markers.done_marker_id.to_string())
            .event("done")
            .to_wire();
        let _ = tx.send(done).await;
    });

    ReceiverStream::new(rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    async fn collect(stream: ReceiverStream<String>) -> Vec<String> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_one_frame_per_character() {
        let frames = collect(char_stream("hi!".to_string(), Duration::ZERO)).await;
        assert_eq!(frames, vec!["data: h\n\n", "data: i\n\n", "data: !\n\n"]);
    }

    #[tokio::test]
    async fn test_multibyte_characters_stay_whole() {
        let frames = collect(char_stream("né".to_string(), Duration::ZERO)).await;
        assert_eq!(frames, vec!["data: n\n\n", "data: é\n\n"]);
    }

    #[tokio::test]
    async fn test_empty_content_yields_no_frames() {
        let frames = collect(char_stream(String::new(), Duration::ZERO)).await;
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn test_bracketed_stream_wire_bytes() {
        let frames = collect(bracketed_char_stream(
            "ab".to_string(),
            Duration::ZERO,
            StreamConfig::default(),
        ))
        .await;
        assert_eq!(
            frames.concat(),
            "id: 3939889\nretry: 2500\nevent: open\n\
             data: a\n\n\
             data: b\n\n\
             id: 28825252\nevent: done\n\n"
        );
    }

    #[tokio::test]
    async fn test_brackets_emitted_around_empty_content() {
        let frames = collect(bracketed_char_stream(
            String::new(),
            Duration::ZERO,
            StreamConfig::default(),
        ))
        .await;
        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames.concat(),
            "id: 3939889\nretry: 2500\nevent: open\nid: 28825252\nevent: done\n\n"
        );
    }
}
