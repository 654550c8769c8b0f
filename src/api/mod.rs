//! API module for HTTP and WebSocket endpoints
//!
//! This module exposes the chat WebSocket endpoint and a small read-only
//! HTTP surface (health check, room overview).

pub mod http;
pub mod websocket;

pub use http::create_router;
