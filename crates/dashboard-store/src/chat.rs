use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::StoreError;
use crate::models::ChatTurn;

pub struct ChatHistoryStore {
    pool: SqlitePool,
}

impl ChatHistoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one exchange to the session transcript.
    pub async fn append(
        &self,
        session_id: &str,
        user_message: &str,
        ai_response: &str,
        stock_symbol: Option<&str>,
    ) -> Result<i64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO chat_history (session_id, user_message, ai_response, stock_symbol, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(session_id)
        .bind(user_message)
        .bind(ai_response)
        .bind(stock_symbol)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// The most recent `limit` turns, returned in chronological order.
    pub async fn recent(&self, session_id: &str, limit: i64) -> Result<Vec<ChatTurn>, StoreError> {
        let mut turns: Vec<ChatTurn> = sqlx::query_as(
            r#"
            SELECT id, session_id, user_message, ai_response, stock_symbol, created_at
            FROM chat_history
            WHERE session_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        turns.reverse();
        Ok(turns)
    }

    /// The full session transcript in creation order.
    pub async fn session_history(&self, session_id: &str) -> Result<Vec<ChatTurn>, StoreError> {
        let turns = sqlx::query_as(
            r#"
            SELECT id, session_id, user_message, ai_response, stock_symbol, created_at
            FROM chat_history
            WHERE session_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::DashboardDb;

    #[tokio::test]
    async fn recent_returns_last_n_in_chronological_order() {
        let db = DashboardDb::new("sqlite::memory:").await.unwrap();
        let chat = db.chat();

        for i in 1..=7 {
            chat.append("s1", &format!("q{}", i), &format!("a{}", i), None)
                .await
                .unwrap();
        }
        chat.append("other", "unrelated", "turn", None).await.unwrap();

        let recent = chat.recent("s1", 5).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].user_message, "q3");
        assert_eq!(recent[4].user_message, "q7");
    }

    #[tokio::test]
    async fn session_history_is_ordered_and_scoped() {
        let db = DashboardDb::new("sqlite::memory:").await.unwrap();
        let chat = db.chat();

        chat.append("s1", "first", "one", Some("AAPL")).await.unwrap();
        chat.append("s1", "second", "two", None).await.unwrap();

        let history = chat.session_history("s1").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_message, "first");
        assert_eq!(history[0].stock_symbol.as_deref(), Some("AAPL"));
        assert_eq!(history[1].user_message, "second");

        assert!(chat.session_history("missing").await.unwrap().is_empty());
    }
}
