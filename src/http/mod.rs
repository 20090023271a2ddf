//! HTTP API server for external control (overlay/popup clients)
//!
//! This module provides a REST API for controlling the capture pipeline:
//! - POST /capture/start - Start a capture session
//! - POST /capture/stop - Stop the active session
//! - POST /capture/reconfigure - Update settings mid-session
//! - GET /capture/status - Query lifecycle state and counters
//! - GET /capture/transcript - Get the accumulated transcript
//! - GET /capture/transcript/export - Plain-text transcript export
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, SourceFactory};
