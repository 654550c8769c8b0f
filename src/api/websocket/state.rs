//! WebSocket application state

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::room::RoomRegistry;

/// Shared application state for WebSocket connections
pub struct AppState {
    /// The room registry shared by every session
    pub registry: Arc<RoomRegistry>,

    pub config: RelayConfig,
}

impl AppState {
    /// Create a new AppState with a fresh registry
    pub fn new(config: RelayConfig) -> Self {
        Self::with_registry(Arc::new(RoomRegistry::new()), config)
    }

    /// Create a new AppState around an existing registry
    pub fn with_registry(registry: Arc<RoomRegistry>, config: RelayConfig) -> Self {
        Self { registry, config }
    }
}
