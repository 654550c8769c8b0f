//! Per-connection session state machine
//!
//! `Idle -> Joining -> Active -> Leaving -> Closed`
//!
//! A session joins its room before accepting the connection, relays inbound
//! chat messages to the room, writes room events back to its own connection
//! and always leaves the room on the way out, whatever ended the session.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::connection::{Connection, Frame, CLOSE_PROTOCOL_ERROR};
use crate::config::{MalformedFramePolicy, RelayConfig};
use crate::error::RelayResult;
use crate::room::{ChatMessage, ConnectionId, MemberHandle, RoomEvent, RoomId, RoomRegistry};

/// Lifecycle states of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Joining,
    Active,
    Leaving,
    Closed,
}

/// How a session ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The transport refused the connection after the room was joined
    Rejected,
    /// The peer sent a close frame
    PeerClosed(Option<u16>),
    /// The transport vanished or errored
    Disconnected,
    /// We closed the connection after a malformed frame
    ProtocolError,
}

enum Step {
    Continue,
    End(SessionEnd),
}

/// Orchestrates one connection's membership in one room
pub struct SessionHandler<C: Connection> {
    id: ConnectionId,
    room: RoomId,
    conn: C,
    registry: Arc<RoomRegistry>,
    outbox_capacity: usize,
    on_malformed: MalformedFramePolicy,
    state: SessionState,
}

impl<C: Connection> SessionHandler<C> {
    pub fn new(conn: C, room: RoomId, registry: Arc<RoomRegistry>, config: &RelayConfig) -> Self {
        Self {
            id: ConnectionId::new(),
            room,
            conn,
            registry,
            outbox_capacity: config.outbox_capacity,
            on_malformed: config.on_malformed,
            state: SessionState::Idle,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive the session until the connection ends.
    ///
    /// The room is left before this returns, and the session ends in
    /// [`SessionState::Closed`]. Running a closed session again is a no-op.
    pub async fn run(&mut self) -> SessionEnd {
        if self.state != SessionState::Idle {
            return SessionEnd::Disconnected;
        }

        self.transition(SessionState::Joining);
        let (tx, mut outbox) = mpsc::channel(self.outbox_capacity);
        self.registry
            .join(&self.room, MemberHandle::new(self.id, tx));

        let end = match self.conn.accept().await {
            Ok(()) => {
                info!(room = %self.room, conn = %self.id, "connection accepted");
                self.transition(SessionState::Active);
                self.relay(&mut outbox).await
            }
            Err(err) => {
                warn!(room = %self.room, conn = %self.id, error = %err, "accept failed");
                SessionEnd::Rejected
            }
        };

        self.transition(SessionState::Leaving);
        self.registry.leave(&self.room, self.id);
        info!(room = %self.room, conn = %self.id, end = ?end, "session closed");
        self.transition(SessionState::Closed);

        end
    }

    async fn relay(&mut self, outbox: &mut mpsc::Receiver<RoomEvent>) -> SessionEnd {
        loop {
            let step = tokio::select! {
                event = outbox.recv() => match event {
                    Some(event) => self.deliver(event).await,
                    // The registry dropped our handle; nothing more will arrive
                    None => Step::End(SessionEnd::Disconnected),
                },

                frame = self.conn.recv() => match frame {
                    Some(Ok(Frame::Text(text))) => self.on_text(&text).await,
                    Some(Ok(Frame::Binary(_))) => {
                        debug!(conn = %self.id, "ignoring binary frame");
                        Step::Continue
                    }
                    Some(Ok(Frame::Close(code))) => Step::End(SessionEnd::PeerClosed(code)),
                    Some(Err(err)) => {
                        warn!(conn = %self.id, error = %err, "receive failed");
                        Step::End(SessionEnd::Disconnected)
                    }
                    None => Step::End(SessionEnd::Disconnected),
                },
            };

            if let Step::End(end) = step {
                return end;
            }
        }
    }

    /// Inbound frame from our own client
    async fn on_text(&mut self, text: &str) -> Step {
        match ChatMessage::parse(text) {
            Ok(msg) => {
                self.registry.broadcast(&self.room, msg.into());
                Step::Continue
            }
            Err(err) => match self.on_malformed {
                MalformedFramePolicy::Drop => {
                    warn!(conn = %self.id, error = %err, "dropping malformed frame");
                    Step::Continue
                }
                MalformedFramePolicy::Close => {
                    warn!(conn = %self.id, error = %err, "closing on malformed frame");
                    if let Err(err) = self.conn.close(CLOSE_PROTOCOL_ERROR, "malformed frame").await {
                        debug!(conn = %self.id, error = %err, "close failed");
                    }
                    Step::End(SessionEnd::ProtocolError)
                }
            },
        }
    }

    /// Room event addressed to this member
    async fn deliver(&mut self, event: RoomEvent) -> Step {
        match self.send_event(event).await {
            Ok(()) => Step::Continue,
            Err(err) => {
                debug!(conn = %self.id, error = %err, "send failed");
                Step::End(SessionEnd::Disconnected)
            }
        }
    }

    async fn send_event(&mut self, event: RoomEvent) -> RelayResult<()> {
        match event {
            RoomEvent::ChatMessage { message } => {
                let frame = ChatMessage::new(message).to_frame()?;
                self.conn.send(frame).await
            }
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(conn = %self.id, from = ?self.state, to = ?next, "session state");
        self.state = next;
    }
}
