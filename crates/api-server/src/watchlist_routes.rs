//! Watchlist CRUD. Symbols are stored uppercase; a (user, symbol) pair
//! exists at most once.

use axum::extract::{Path, Query, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{AppError, AppState};

const DEFAULT_USER: &str = "default_user";

#[derive(Debug, Deserialize)]
pub struct WatchlistQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WatchlistItem {
    pub symbol: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_user_id() -> String {
    DEFAULT_USER.to_string()
}

pub fn watchlist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/watchlist", get(get_watchlist).post(add_to_watchlist))
        .route("/api/watchlist/:symbol", delete(remove_from_watchlist))
}

async fn get_watchlist(
    State(state): State<AppState>,
    Query(query): Query<WatchlistQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = query.user_id.unwrap_or_else(|| DEFAULT_USER.to_string());

    let symbols = state.db.watchlist().symbols(&user_id).await?;
    if symbols.is_empty() {
        return Ok(Json(json!({ "user_id": user_id, "stocks": [] })));
    }

    let stocks = state
        .quotes
        .get_quotes(&symbols)
        .await
        .map_err(|e| anyhow::anyhow!("watchlist fetch failed: {}", e))?;

    Ok(Json(json!({ "user_id": user_id, "stocks": stocks })))
}

async fn add_to_watchlist(
    State(state): State<AppState>,
    Json(item): Json<WatchlistItem>,
) -> Result<Json<Value>, AppError> {
    state.db.watchlist().add(&item.user_id, &item.symbol).await?;

    Ok(Json(json!({
        "message": format!("Added {} to watchlist", item.symbol)
    })))
}

async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(query): Query<WatchlistQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = query.user_id.unwrap_or_else(|| DEFAULT_USER.to_string());

    state.db.watchlist().remove(&user_id, &symbol).await?;

    Ok(Json(json!({
        "message": format!("Removed {} from watchlist", symbol)
    })))
}
