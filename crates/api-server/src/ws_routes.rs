//! Realtime stock updates over WebSocket.
//!
//! Every connection runs its own fetch/push/sleep cycle over the same fixed
//! symbol set. There is no shared fan-out and no coalescing of fetches:
//! one connection's failure never touches another's.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::Mutex;
use yahoo_client::{QuoteProvider, StockQuote};

use crate::AppState;

/// Symbols every realtime connection receives. Fixed for the connection's
/// lifetime; there is no subscription management.
pub const TRACKED_SYMBOLS: &[&str] = &["AAPL", "GOOGL", "MSFT", "TSLA", "AMZN"];

/// Poll cadence, kept coarse to stay under upstream rate limits.
const UPDATE_INTERVAL: Duration = Duration::from_secs(30);

/// One push of current snapshots; also the shape of the polling batch
/// endpoint's response.
#[derive(Debug, Clone, Serialize)]
pub struct StockUpdateFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Vec<StockQuote>,
    pub timestamp: String,
}

impl StockUpdateFrame {
    pub fn new(data: Vec<StockQuote>) -> Self {
        Self {
            kind: "stock_update".to_string(),
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Open realtime connections. Registration and unregistration happen only at
/// task boundaries, but tasks run on a multi-threaded scheduler, so the list
/// is mutex-guarded.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<Mutex<Vec<u64>>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    pub async fn register(&self) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.connections.lock().await.push(id);
        id
    }

    pub async fn unregister(&self, id: u64) {
        self.connections.lock().await.retain(|&conn| conn != id);
    }

    pub async fn contains(&self, id: u64) -> bool {
        self.connections.lock().await.contains(&id)
    }

    pub async fn len(&self) -> usize {
        self.connections.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.connections.lock().await.is_empty()
    }
}

/// Outbound half of one realtime connection; lets tests drive the update
/// loop without a socket.
#[async_trait]
pub trait UpdateSink: Send {
    async fn send_frame(&mut self, frame: &StockUpdateFrame) -> anyhow::Result<()>;
}

struct WsSink(SplitSink<WebSocket, Message>);

#[async_trait]
impl UpdateSink for WsSink {
    async fn send_frame(&mut self, frame: &StockUpdateFrame) -> anyhow::Result<()> {
        let json = serde_json::to_string(frame)?;
        self.0.send(Message::Text(json)).await?;
        Ok(())
    }
}

pub fn ws_routes() -> Router<AppState> {
    Router::new().route("/ws/stocks", get(ws_stocks_handler))
}

async fn ws_stocks_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_stock_socket(socket, state))
}

async fn handle_stock_socket(socket: WebSocket, state: AppState) {
    let (sender, mut receiver) = socket.split();

    // Surface transport-level disconnects; axum answers pings itself.
    let closed = async move {
        while let Some(Ok(message)) = receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    };

    let symbols: Vec<String> = TRACKED_SYMBOLS.iter().map(|s| s.to_string()).collect();

    serve_connection(
        &state.connections,
        WsSink(sender),
        closed,
        state.quotes.clone(),
        symbols,
        UPDATE_INTERVAL,
    )
    .await;
}

/// Run one connection's update cycle. The registry entry is removed at a
/// single exit point, so cleanup happens exactly once whichever way the
/// loop ends: disconnect, fetch failure, or send failure.
pub(crate) async fn serve_connection<S, F>(
    registry: &ConnectionRegistry,
    sink: S,
    closed: F,
    quotes: Arc<dyn QuoteProvider>,
    symbols: Vec<String>,
    interval: Duration,
) where
    S: UpdateSink,
    F: Future<Output = ()>,
{
    let conn = registry.register().await;
    tracing::info!(conn, "realtime client connected");

    tokio::select! {
        _ = push_updates(sink, quotes, &symbols, interval) => {}
        _ = closed => {
            tracing::info!(conn, "realtime client disconnected");
        }
    }

    registry.unregister(conn).await;
    tracing::info!(conn, "realtime connection closed");
}

/// Fetch current snapshots, push one frame, sleep, repeat. A fetch or send
/// failure ends the loop; there are no in-loop retries.
async fn push_updates<S: UpdateSink>(
    mut sink: S,
    quotes: Arc<dyn QuoteProvider>,
    symbols: &[String],
    interval: Duration,
) {
    loop {
        let data = match quotes.get_quotes(symbols).await {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!(error = %e, "stock update fetch failed");
                break;
            }
        };

        let frame = StockUpdateFrame::new(data);
        if let Err(e) = sink.send_frame(&frame).await {
            tracing::warn!(error = %e, "stock update send failed");
            break;
        }

        tokio::time::sleep(interval).await;
    }
}
