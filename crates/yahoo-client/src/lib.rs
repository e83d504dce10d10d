pub mod client;
pub mod error;
pub mod types;

pub use client::YahooFinanceClient;
pub use error::QuoteError;
pub use types::{PricePoint, StockQuote};

use async_trait::async_trait;

/// Source of point-in-time stock data. The HTTP surface, the realtime
/// broadcaster, and the chat flow all consume quotes through this trait so
/// tests can substitute a canned provider.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the current snapshot for one symbol.
    async fn get_quote(&self, symbol: &str) -> Result<StockQuote, QuoteError>;

    /// Fetch snapshots for several symbols, dropping the ones that fail.
    async fn get_quotes(&self, symbols: &[String]) -> Result<Vec<StockQuote>, QuoteError> {
        let mut quotes = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            match self.get_quote(symbol).await {
                Ok(quote) => quotes.push(quote),
                Err(e) => {
                    tracing::debug!(symbol = %symbol, error = %e, "skipping failed symbol");
                }
            }
        }
        Ok(quotes)
    }

    /// Fetch OHLCV history for a symbol over `period` at `interval`
    /// granularity (Yahoo range strings: 1d, 5d, 1mo, ..., and 1m, 5m, 1h,
    /// 1d respectively).
    async fn get_history(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<PricePoint>, QuoteError>;
}
