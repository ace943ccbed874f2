//! sse-relay: streams text to HTTP clients as Server-Sent Events.
//!
//! Three behaviors behind one listener:
//!   character-by-character streaming with per-frame pacing,
//!   the same stream bracketed by open/done marker frames,
//!   and re-framing of a generation backend's NDJSON stream as SSE.

pub mod config;
pub mod relay;
pub mod server;
pub mod sse;
