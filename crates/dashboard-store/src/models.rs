use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One chat exchange within a session. Append-only; never edited.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatTurn {
    pub id: i64,
    pub session_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub stock_symbol: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One tracked (user, symbol) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WatchlistEntry {
    pub id: i64,
    pub user_id: String,
    pub symbol: String,
    pub created_at: DateTime<Utc>,
}
