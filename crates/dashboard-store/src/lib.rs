//! Durable storage for price snapshots, chat transcripts, and watchlist
//! rows, backed by sqlite.

pub mod chat;
pub mod db;
pub mod error;
pub mod models;
pub mod prices;
pub mod watchlist;

pub use chat::ChatHistoryStore;
pub use db::DashboardDb;
pub use error::StoreError;
pub use models::{ChatTurn, WatchlistEntry};
pub use prices::PriceStore;
pub use watchlist::WatchlistStore;
