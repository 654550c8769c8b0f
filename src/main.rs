//! Chat Relay - Binary Entry Point
//!
//! Reads `CHAT_*` configuration from the environment and serves the chat
//! WebSocket endpoint until Ctrl+C / SIGTERM.

use std::sync::Arc;

use chat_relay::api::create_router;
use chat_relay::{logging, AppState, RelayConfig, RelayResult};
use tracing::info;

#[tokio::main]
async fn main() -> RelayResult<()> {
    let config = RelayConfig::from_env()?;
    logging::init(config.log_json);

    let addr = config.bind_addr();
    let state = Arc::new(AppState::new(config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, version = chat_relay::VERSION, "chat relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("chat relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
