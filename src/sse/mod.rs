//! SSE wire format.
//!
//! - [`frame`]: frame construction and text encoding

pub mod frame;

pub use frame::SseFrame;
