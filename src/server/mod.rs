//! HTTP server exposing the streaming endpoints.
//!
//! - [`routes`]: Request types, route handlers, and router construction

pub mod routes;
