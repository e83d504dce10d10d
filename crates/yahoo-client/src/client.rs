use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::error::QuoteError;
use crate::types::{PricePoint, StockQuote};
use crate::QuoteProvider;

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance";

// Yahoo rejects requests without a browser-looking user agent.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: reqwest::Client,
}

impl YahooFinanceClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client }
    }

    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, QuoteError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(QuoteError::Upstream(format!("HTTP {}", response.status())));
        }

        Ok(response.json().await?)
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteProvider for YahooFinanceClient {
    async fn get_quote(&self, symbol: &str) -> Result<StockQuote, QuoteError> {
        let symbol = symbol.to_uppercase();
        let url = format!("{}/quote?symbols={}", BASE_URL, symbol);
        let json = self.fetch_json(&url).await?;

        let quote = json
            .get("quoteResponse")
            .and_then(|v| v.get("result"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .ok_or_else(|| QuoteError::NotFound(symbol.clone()))?;

        let company_name = quote
            .get("longName")
            .or_else(|| quote.get("shortName"))
            .and_then(|v| v.as_str())
            .unwrap_or(&symbol)
            .to_string();

        Ok(StockQuote {
            symbol: quote
                .get("symbol")
                .and_then(|v| v.as_str())
                .unwrap_or(&symbol)
                .to_string(),
            company_name,
            price: field_f64(quote, "regularMarketPrice").unwrap_or(0.0),
            change_percent: field_f64(quote, "regularMarketChangePercent").unwrap_or(0.0),
            volume: field_i64(quote, "regularMarketVolume").unwrap_or(0),
            market_cap: field_i64(quote, "marketCap").unwrap_or(0),
            timestamp: Utc::now(),
            previous_close: field_f64(quote, "regularMarketPreviousClose"),
            open: field_f64(quote, "regularMarketOpen"),
            day_high: field_f64(quote, "regularMarketDayHigh"),
            day_low: field_f64(quote, "regularMarketDayLow"),
            year_high: field_f64(quote, "fiftyTwoWeekHigh"),
            year_low: field_f64(quote, "fiftyTwoWeekLow"),
            pe_ratio: field_f64(quote, "trailingPE"),
            eps: field_f64(quote, "epsTrailingTwelveMonths"),
            dividend_yield: field_f64(quote, "dividendYield"),
            beta: field_f64(quote, "beta"),
            avg_volume: field_i64(quote, "averageDailyVolume3Month"),
            sector: field_string(quote, "sector"),
            industry: field_string(quote, "industry"),
            description: field_string(quote, "longBusinessSummary"),
        })
    }

    async fn get_history(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<PricePoint>, QuoteError> {
        let symbol = symbol.to_uppercase();
        let url = format!(
            "{}/chart/{}?range={}&interval={}",
            BASE_URL, symbol, period, interval
        );
        let json = self.fetch_json(&url).await?;

        let chart = json
            .get("chart")
            .and_then(|v| v.get("result"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .ok_or_else(|| QuoteError::NotFound(symbol.clone()))?;

        let timestamps = match chart.get("timestamp").and_then(|v| v.as_array()) {
            Some(ts) => ts,
            None => return Ok(Vec::new()),
        };

        let quote = chart
            .get("indicators")
            .and_then(|v| v.get("quote"))
            .and_then(|v| v.as_array())
            .and_then(|arr| arr.first())
            .ok_or_else(|| QuoteError::Upstream("no quote indicators in chart".to_string()))?;

        let opens = indicator_series(quote, "open")?;
        let highs = indicator_series(quote, "high")?;
        let lows = indicator_series(quote, "low")?;
        let closes = indicator_series(quote, "close")?;
        let volumes = indicator_series(quote, "volume")?;

        let mut points = Vec::with_capacity(timestamps.len());

        // Yahoo pads gaps with nulls; rows with any missing value are dropped.
        for i in 0..timestamps.len() {
            if let (Some(ts), Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
                timestamps[i].as_i64(),
                opens.get(i).and_then(|v| v.as_f64()),
                highs.get(i).and_then(|v| v.as_f64()),
                lows.get(i).and_then(|v| v.as_f64()),
                closes.get(i).and_then(|v| v.as_f64()),
                volumes.get(i).and_then(|v| v.as_u64()),
            ) {
                let timestamp = DateTime::from_timestamp(ts, 0)
                    .ok_or_else(|| QuoteError::Upstream(format!("invalid timestamp {}", ts)))?;
                points.push(PricePoint {
                    timestamp,
                    open,
                    high,
                    low,
                    close,
                    volume,
                });
            }
        }

        Ok(points)
    }
}

fn field_f64(value: &serde_json::Value, key: &str) -> Option<f64> {
    value.get(key).and_then(|v| v.as_f64())
}

fn field_i64(value: &serde_json::Value, key: &str) -> Option<i64> {
    value.get(key).and_then(|v| v.as_i64())
}

fn field_string(value: &serde_json::Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn indicator_series<'a>(
    quote: &'a serde_json::Value,
    key: &str,
) -> Result<&'a Vec<serde_json::Value>, QuoteError> {
    quote
        .get(key)
        .and_then(|v| v.as_array())
        .ok_or_else(|| QuoteError::Upstream(format!("no {} series in chart", key)))
}
