//! Frame producers behind the streaming endpoints.
//!
//! - [`chars`]: character-by-character streaming with per-frame pacing
//! - [`ndjson`]: NDJSON-to-SSE relay against the generation backend

pub mod chars;
pub mod ndjson;

/// Capacity of the frame channel between a producer task and the HTTP body.
pub(crate) const FRAME_CHANNEL_CAPACITY: usize = 32;
