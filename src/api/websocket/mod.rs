//! WebSocket module for chat rooms
//!
//! Provides the endpoint at `/ws/chat/:room_name/`. Each upgraded socket is
//! wrapped in a [`WsConnection`] and driven by a
//! [`SessionHandler`](crate::session::SessionHandler).

pub mod connection;
pub mod handler;
pub mod state;

pub use connection::WsConnection;
pub use handler::ws_handler;
pub use state::AppState;
