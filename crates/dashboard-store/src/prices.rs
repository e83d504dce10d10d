use sqlx::SqlitePool;
use yahoo_client::StockQuote;

use crate::error::StoreError;

/// Append-only log of fetched snapshots.
pub struct PriceStore {
    pool: SqlitePool,
}

impl PriceStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, quote: &StockQuote) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO stock_prices (symbol, company_name, price, change_percent, volume, market_cap, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&quote.symbol)
        .bind(&quote.company_name)
        .bind(quote.price)
        .bind(quote.change_percent)
        .bind(quote.volume)
        .bind(quote.market_cap)
        .bind(quote.timestamp)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }
}
