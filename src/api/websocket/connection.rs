//! `Connection` over an axum WebSocket

use std::borrow::Cow;

use async_trait::async_trait;
use axum::extract::ws::{CloseFrame, Message, WebSocket};

use crate::error::{RelayError, RelayResult};
use crate::session::{Connection, Frame};

/// An upgraded axum WebSocket.
///
/// The HTTP upgrade has already completed when this is built, so `accept`
/// only opens the connection for sending.
pub struct WsConnection {
    socket: WebSocket,
    accepted: bool,
}

impl WsConnection {
    pub fn new(socket: WebSocket) -> Self {
        Self {
            socket,
            accepted: false,
        }
    }
}

#[async_trait]
impl Connection for WsConnection {
    async fn accept(&mut self) -> RelayResult<()> {
        self.accepted = true;
        Ok(())
    }

    async fn recv(&mut self) -> Option<RelayResult<Frame>> {
        loop {
            let msg = match self.socket.recv().await? {
                Ok(msg) => msg,
                Err(err) => return Some(Err(err.into())),
            };
            let frame = match msg {
                Message::Text(text) => Frame::Text(text),
                Message::Binary(data) => Frame::Binary(data),
                Message::Close(frame) => Frame::Close(frame.map(|f| f.code)),
                // Pings are answered by the protocol layer
                Message::Ping(_) | Message::Pong(_) => continue,
            };
            return Some(Ok(frame));
        }
    }

    async fn send(&mut self, text: String) -> RelayResult<()> {
        if !self.accepted {
            return Err(RelayError::Transport("connection not accepted".to_string()));
        }
        Ok(self.socket.send(Message::Text(text)).await?)
    }

    async fn close(&mut self, code: u16, reason: &str) -> RelayResult<()> {
        let frame = CloseFrame {
            code,
            reason: Cow::Owned(reason.to_string()),
        };
        Ok(self.socket.send(Message::Close(Some(frame))).await?)
    }
}
