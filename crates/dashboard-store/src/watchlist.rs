use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::models::WatchlistEntry;

pub struct WatchlistStore {
    pool: SqlitePool,
}

impl WatchlistStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Symbols on a user's watchlist, oldest first.
    pub async fn symbols(&self, user_id: &str) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT symbol FROM watchlist WHERE user_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(symbol,)| symbol).collect())
    }

    pub async fn entries(&self, user_id: &str) -> Result<Vec<WatchlistEntry>, StoreError> {
        let entries = sqlx::query_as(
            r#"
            SELECT id, user_id, symbol, created_at
            FROM watchlist
            WHERE user_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Track a symbol. The duplicate check is an explicit lookup so the
    /// surface can answer the duplicate case distinctly.
    pub async fn add(&self, user_id: &str, symbol: &str) -> Result<i64, StoreError> {
        let symbol = symbol.to_uppercase();

        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM watchlist WHERE user_id = ? AND symbol = ?")
                .bind(user_id)
                .bind(&symbol)
                .fetch_optional(&self.pool)
                .await?;

        if existing.is_some() {
            return Err(StoreError::AlreadyInWatchlist);
        }

        let result = sqlx::query("INSERT INTO watchlist (user_id, symbol, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(&symbol)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Stop tracking a symbol.
    pub async fn remove(&self, user_id: &str, symbol: &str) -> Result<(), StoreError> {
        let symbol = symbol.to_uppercase();

        let result = sqlx::query("DELETE FROM watchlist WHERE user_id = ? AND symbol = ?")
            .bind(user_id)
            .bind(&symbol)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotInWatchlist);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DashboardDb;

    #[tokio::test]
    async fn duplicate_add_is_rejected_and_stores_one_row() {
        let db = DashboardDb::new("sqlite::memory:").await.unwrap();
        let watchlist = db.watchlist();

        watchlist.add("u1", "aapl").await.unwrap();
        let err = watchlist.add("u1", "AAPL").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyInWatchlist));

        let symbols = watchlist.symbols("u1").await.unwrap();
        assert_eq!(symbols, vec!["AAPL".to_string()]);
    }

    #[tokio::test]
    async fn same_symbol_is_allowed_for_different_users() {
        let db = DashboardDb::new("sqlite::memory:").await.unwrap();
        let watchlist = db.watchlist();

        watchlist.add("u1", "AAPL").await.unwrap();
        watchlist.add("u2", "AAPL").await.unwrap();

        assert_eq!(watchlist.symbols("u1").await.unwrap().len(), 1);
        assert_eq!(watchlist.symbols("u2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn removing_missing_entry_leaves_store_unchanged() {
        let db = DashboardDb::new("sqlite::memory:").await.unwrap();
        let watchlist = db.watchlist();

        watchlist.add("u1", "AAPL").await.unwrap();

        let err = watchlist.remove("u1", "MSFT").await.unwrap_err();
        assert!(matches!(err, StoreError::NotInWatchlist));
        assert_eq!(watchlist.symbols("u1").await.unwrap(), vec!["AAPL".to_string()]);

        watchlist.remove("u1", "aapl").await.unwrap();
        assert!(watchlist.symbols("u1").await.unwrap().is_empty());
    }
}
