//! Per-connection sessions
//!
//! A session owns one [`Connection`] and drives it through the room
//! lifecycle against a shared [`RoomRegistry`](crate::room::RoomRegistry).

pub mod connection;
pub mod handler;

pub use connection::{Connection, Frame, CLOSE_NORMAL, CLOSE_PROTOCOL_ERROR};
pub use handler::{SessionEnd, SessionHandler, SessionState};
