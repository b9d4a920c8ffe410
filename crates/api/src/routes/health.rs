use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn health_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
}

/// Liveness line for uptime pingers.
async fn root() -> &'static str {
    "Bot is running"
}

/// Health check endpoint, no auth required.
async fn healthz(State(state): State<AppState>) -> Json<Value> {
    let status = state.status.read().await;
    Json(json!({
        "status": "ok",
        "symbols": state.symbols,
        "cycles": status.cycles,
        "skipped_cycles": status.skipped_cycles,
        "last_cycle_at": status.last_cycle_at,
    }))
}
