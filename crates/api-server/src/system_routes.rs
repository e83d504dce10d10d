//! Liveness and API info endpoints.

use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::{AppState, API_VERSION};

pub fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Stock Dashboard API is running!",
        "version": API_VERSION,
        "endpoints": {
            "stocks": "/api/stocks/{symbol}",
            "watchlist": "/api/watchlist",
            "chat": "/api/chat",
            "websocket": "/ws/stocks"
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339()
    }))
}
