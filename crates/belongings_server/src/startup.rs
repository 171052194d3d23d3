//! Server bootstrap: bind, serve, shut down on ctrl-c.

use belongings_core::SqliteBelongingsService;
use log::{info, warn};
use tokio::net::TcpListener;

use crate::errors::ServeError;
use crate::routes::build_router;
use crate::state::AppState;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8002;

/// Listen address of the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port` form, as logged and reported in bind errors.
    pub fn display_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Binds the listener and serves until ctrl-c.
pub async fn serve(config: ServerConfig, service: SqliteBelongingsService) -> Result<(), ServeError> {
    if config.host.trim().is_empty() {
        return Err(ServeError::InvalidAddress(config.display_addr()));
    }
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.display_addr(),
            source,
        })?;
    serve_on(listener, service).await
}

/// Serves on an already-bound listener.
pub async fn serve_on(listener: TcpListener, service: SqliteBelongingsService) -> Result<(), ServeError> {
    let local_addr = listener.local_addr()?;
    let app = build_router(AppState::new(service));
    info!(
        "event=server_start module=server status=ok addr={} version={}",
        local_addr,
        env!("CARGO_PKG_VERSION")
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("event=server_stop module=server status=ok addr={}", local_addr);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(
            "event=server_signal module=server status=error error={}",
            err
        );
        std::future::pending::<()>().await;
    }
}
