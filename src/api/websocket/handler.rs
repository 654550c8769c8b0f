//! WebSocket upgrade handler for `/ws/chat/:room_name/`

use std::sync::Arc;

use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::connection::WsConnection;
use super::state::AppState;
use crate::room::RoomId;
use crate::session::SessionHandler;

/// WebSocket upgrade handler
///
/// Room names outside `[A-Za-z0-9._-]` are refused with 400 before the
/// upgrade.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room_name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let room = match RoomId::parse(room_name) {
        Ok(room) => room,
        Err(err) => {
            warn!(error = %err, "refusing websocket upgrade");
            return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
        }
    };

    debug!(room = %room, group = %room.group_key(), "upgrading websocket");
    ws.on_upgrade(move |socket| async move {
        let mut session = SessionHandler::new(
            WsConnection::new(socket),
            room,
            state.registry.clone(),
            &state.config,
        );
        session.run().await;
    })
}
