//! Error types for the chat relay

use thiserror::Error;

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors raised by the relay.
///
/// None of these are fatal once the server is running: each one is scoped to
/// a single connection or a single frame.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Room name is empty, too long, or contains characters outside
    /// `[A-Za-z0-9._-]`
    #[error("invalid room name: {0:?}")]
    InvalidRoomName(String),

    /// Inbound text frame is not a `{"message": "<text>"}` object
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),

    /// The transport refused to accept the connection
    #[error("connection rejected: {0}")]
    AcceptRejected(String),

    /// Send/receive failure on the underlying duplex channel
    #[error("transport error: {0}")]
    Transport(String),

    /// An environment variable could not be parsed
    #[error("invalid value {value:?} for {key}")]
    Config { key: &'static str, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<axum::Error> for RelayError {
    fn from(err: axum::Error) -> Self {
        RelayError::Transport(err.to_string())
    }
}
