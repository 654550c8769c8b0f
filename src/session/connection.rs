//! Transport abstraction for one client's duplex channel

use async_trait::async_trait;

use crate::error::RelayResult;

/// WebSocket close code for a protocol error
pub const CLOSE_PROTOCOL_ERROR: u16 = 1002;

/// WebSocket close code for a normal closure
pub const CLOSE_NORMAL: u16 = 1000;

/// Inbound frame, already stripped of transport control traffic
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    /// Peer closed the connection, with its close code if one was sent
    Close(Option<u16>),
}

/// One client's live duplex channel.
///
/// `recv` returning `None` means the transport is gone without a close
/// handshake (abnormal disconnect).
#[async_trait]
pub trait Connection: Send {
    /// Signal that the connection is accepted
    async fn accept(&mut self) -> RelayResult<()>;

    /// Wait for the next inbound frame
    async fn recv(&mut self) -> Option<RelayResult<Frame>>;

    /// Send one text frame
    async fn send(&mut self, text: String) -> RelayResult<()>;

    /// Close the connection with `code`
    async fn close(&mut self, code: u16, reason: &str) -> RelayResult<()>;
}
