use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::chat::ChatHistoryStore;
use crate::prices::PriceStore;
use crate::watchlist::WatchlistStore;

#[derive(Clone)]
pub struct DashboardDb {
    pool: SqlitePool,
}

impl DashboardDb {
    /// Open (creating if missing) the database and bootstrap the schema.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // An in-memory sqlite database exists per connection; a larger pool
        // would hand out connections that never saw the schema.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;

        Ok(db)
    }

    async fn init_schema(&self) -> Result<()> {
        let schema = include_str!("../../../schema.sql");

        // sqlx executes one statement at a time.
        for statement in schema.split(';') {
            let stmt = statement.trim();
            if !stmt.is_empty() {
                sqlx::query(stmt).execute(&self.pool).await?;
            }
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn prices(&self) -> PriceStore {
        PriceStore::new(self.pool.clone())
    }

    pub fn chat(&self) -> ChatHistoryStore {
        ChatHistoryStore::new(self.pool.clone())
    }

    pub fn watchlist(&self) -> WatchlistStore {
        WatchlistStore::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_bootstraps_on_open() {
        let db = DashboardDb::new("sqlite::memory:").await.unwrap();
        assert!(db.pool().acquire().await.is_ok());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM watchlist")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }
}
