//! SSE frame encoding.
//!
//! Builds individual Server-Sent Events frames and renders them as wire
//! text. Field lines come out in protocol order (`id`, `retry`, `event`,
//! `data`), and a terminated frame always ends with a blank line.

use std::fmt::Write;

/// A single SSE frame: optional metadata fields plus optional data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    id: Option<String>,
    retry_ms: Option<u64>,
    event: Option<String>,
    data: Option<String>,
}

impl SseFrame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Reconnection delay hint in milliseconds.
    pub fn retry_ms(mut self, ms: u64) -> Self {
        self.retry_ms = Some(ms);
        self
    }

    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.event = Some(name.into());
        self
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Render as a terminated SSE event, ending with a blank line.
    ///
    /// A `data` value containing embedded newlines is split into one
    /// `data:` line per text line, per the SSE line-framing rule.
    pub fn to_wire(&self) -> String {
        let mut out = self.field_lines();
        out.push('\n');
        out
    }

    /// Render only the field lines, without the terminating blank line.
    ///
    /// Used for metadata groups that are deliberately left open so they
    /// attach to the next event on the wire (the bracketed character
    /// streamer's opening marker).
    pub fn to_wire_unterminated(&self) -> String {
        self.field_lines()
    }

    fn field_lines(&self) -> String {
        let mut out = String::new();
        if let Some(id) = &self.id {
            let _ = writeln!(out, "id: {id}");
        }
        if let Some(ms) = self.retry_ms {
            let _ = writeln!(out, "retry: {ms}");
        }
        if let Some(event) = &self.event {
            let _ = writeln!(out, "event: {event}");
        }
        if let Some(data) = &self.data {
            for line in data.split('\n') {
                let _ = writeln!(out, "data: {line}");
            }
        }
        out
    }
}
