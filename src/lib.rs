//! Chat Relay
//!
//! A real-time group chat relay. Clients join named rooms over WebSocket and
//! every message a client sends is fanned out to every member of the same
//! room, the sender included. Nothing is persisted: a room exists only while
//! it has members.
//!
//! # Modules
//!
//! - `room`: room names, wire messages and the concurrent `RoomRegistry`
//! - `session`: the `Connection` abstraction and per-connection `SessionHandler`
//! - `api`: axum router, WebSocket upgrade and adapter
//! - `config`: `RelayConfig` loaded from `CHAT_*` environment variables
//! - `error`: `RelayError` and `RelayResult`
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chat_relay::{api, AppState, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() -> chat_relay::RelayResult<()> {
//!     let config = RelayConfig::from_env()?;
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
//!     let app = api::create_router(Arc::new(AppState::new(config)));
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod room;
pub mod session;

// Re-export commonly used items at crate root
pub use api::websocket::AppState;
pub use config::{MalformedFramePolicy, RelayConfig};
pub use error::{RelayError, RelayResult};
pub use room::{ChatMessage, ConnectionId, RoomEvent, RoomId, RoomRegistry};
pub use session::{Connection, SessionHandler};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
