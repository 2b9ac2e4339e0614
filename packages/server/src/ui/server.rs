//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::{
    handler::{get_room_detail, get_rooms, get_scoreboard, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
    ticker::spawn_ticker,
};

/// Brickrally room server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(ServerConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Bind to the configured host and port, then serve until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");
        self.serve(listener).await
    }

    /// Serve on an already bound listener until a shutdown signal arrives.
    pub async fn serve(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app_state = Arc::new(AppState::build(&self.config).await);
        let ticker = spawn_ticker(
            app_state.tick_rooms.clone(),
            self.config.tick_period(),
            self.config.tick_ms,
        );

        let app = Router::new()
            // WebSocket endpoint
            .route("/ws", get(websocket_handler))
            // HTTP endpoints
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .route("/api/scoreboard", get(get_scoreboard))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        tracing::info!("Brickrally server listening on {}", listener.local_addr()?);

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        ticker.abort();
        served?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
