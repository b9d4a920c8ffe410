pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use common::{Result, ScanStatus};

/// Shared application state injected into every route handler.
#[derive(Clone)]
pub struct AppState {
    pub status: Arc<RwLock<ScanStatus>>,
    /// Number of configured symbols.
    pub symbols: usize,
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .merge(routes::health_router())
        .with_state(state)
        .layer(cors)
}

/// Build and run the uptime HTTP server.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Uptime endpoint listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
