//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::websocket::{ws_handler, AppState};
use crate::room::RoomStats;

/// Response body for `GET /api/rooms`
#[derive(Debug, Serialize)]
pub struct RoomsResponse {
    pub total_rooms: usize,
    pub total_members: usize,
    pub rooms: Vec<RoomStats>,
}

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins for development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket endpoint, with and without the trailing slash
        .route("/ws/chat/:room_name/", get(ws_handler))
        .route("/ws/chat/:room_name", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        // Room overview
        .route("/api/rooms", get(list_rooms))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Current rooms and their member counts
async fn list_rooms(State(state): State<Arc<AppState>>) -> Json<RoomsResponse> {
    let rooms = state.registry.stats();
    Json(RoomsResponse {
        total_rooms: rooms.len(),
        total_members: rooms.iter().map(|r| r.members).sum(),
        rooms,
    })
}
