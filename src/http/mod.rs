//! HTTP API server for session control
//!
//! This module provides a REST API for controlling voice query sessions:
//! - POST /sessions/start - Start a new session
//! - POST /sessions/:id/stop - Stop a session
//! - GET /sessions/:id/status - Query session statistics
//! - GET /sessions/:id/history - Get the conversation history
//! - POST /sessions/:id/clear - Clear the conversation history
//! - POST /sessions/:id/query - Manual text query fallback
//! - GET /rtc-config - ICE servers for capture clients
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
