//! Market overview endpoints: major indices and trending movers.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use yahoo_client::StockQuote;

use crate::{AppError, AppState};

const INDEX_SYMBOLS: &[(&str, &str)] = &[
    ("^GSPC", "S&P 500"),
    ("^DJI", "Dow Jones"),
    ("^IXIC", "NASDAQ"),
    ("^VIX", "VIX"),
];

const TRENDING_SYMBOLS: &[&str] = &[
    "AAPL", "TSLA", "NVDA", "META", "GOOGL", "MSFT", "AMZN", "AMD",
];

#[derive(Debug, Serialize)]
pub struct IndexQuote {
    #[serde(flatten)]
    pub quote: StockQuote,
    pub display_name: Option<String>,
}

pub fn market_routes() -> Router<AppState> {
    Router::new()
        .route("/api/market/indices", get(get_market_indices))
        .route("/api/market/trending", get(get_trending_stocks))
}

async fn get_market_indices(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let symbols: Vec<String> = INDEX_SYMBOLS.iter().map(|(s, _)| s.to_string()).collect();

    let quotes = state
        .quotes
        .get_quotes(&symbols)
        .await
        .map_err(|e| anyhow::anyhow!("index fetch failed: {}", e))?;

    let indices: Vec<IndexQuote> = quotes
        .into_iter()
        .map(|quote| {
            let display_name = INDEX_SYMBOLS
                .iter()
                .find(|(symbol, _)| *symbol == quote.symbol)
                .map(|(_, name)| name.to_string());
            IndexQuote {
                quote,
                display_name,
            }
        })
        .collect();

    Ok(Json(json!({
        "indices": indices,
        "timestamp": Utc::now().to_rfc3339()
    })))
}

async fn get_trending_stocks(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let symbols: Vec<String> = TRENDING_SYMBOLS.iter().map(|s| s.to_string()).collect();

    let mut trending = state
        .quotes
        .get_quotes(&symbols)
        .await
        .map_err(|e| anyhow::anyhow!("trending fetch failed: {}", e))?;

    // Most movement first, in either direction.
    trending.sort_by(|a, b| {
        b.change_percent
            .abs()
            .partial_cmp(&a.change_percent.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(Json(json!({
        "trending": trending,
        "timestamp": Utc::now().to_rfc3339()
    })))
}
