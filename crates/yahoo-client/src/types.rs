use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time read of a stock's price and fundamentals. Immutable once
/// constructed; a fresh fetch supersedes rather than mutates a prior one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub company_name: String,
    pub price: f64,
    pub change_percent: f64,
    pub volume: i64,
    pub market_cap: i64,
    pub timestamp: DateTime<Utc>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub year_high: Option<f64>,
    pub year_low: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub avg_volume: Option<i64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
}

/// Single OHLCV bar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}
