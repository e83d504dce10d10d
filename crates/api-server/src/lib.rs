//! HTTP/WebSocket surface for the stock dashboard: live quotes, watchlist
//! management, the AI chat flow, and per-connection realtime updates.

pub mod chat_routes;
pub mod config;
pub mod error;
pub mod market_routes;
pub mod stock_routes;
pub mod system_routes;
pub mod watchlist_routes;
pub mod ws_routes;

pub use config::ServerConfig;
pub use error::AppError;

use std::sync::Arc;

use axum::Router;
use dashboard_store::DashboardDb;
use ollama_client::OllamaClient;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yahoo_client::{QuoteProvider, YahooFinanceClient};

use crate::ws_routes::ConnectionRegistry;

pub const API_VERSION: &str = "1.0.0";

#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<dyn QuoteProvider>,
    pub assistant: OllamaClient,
    pub db: DashboardDb,
    pub connections: ConnectionRegistry,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(system_routes::system_routes())
        .merge(stock_routes::stock_routes())
        .merge(market_routes::market_routes())
        .merge(watchlist_routes::watchlist_routes())
        .merge(chat_routes::chat_routes())
        .merge(ws_routes::ws_routes())
        .layer(TraceLayer::new_for_http())
        // The dashboard frontend is served from a different origin.
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "api_server=info,tower_http=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run_server() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();

    let db = DashboardDb::new(&config.database_url).await?;
    tracing::info!(url = %config.database_url, "database initialized");

    let assistant = OllamaClient::new(config.ollama.clone());
    // Logged only; chat requests are attempted whatever the probe says.
    assistant.check_availability().await;

    let state = AppState {
        quotes: Arc::new(YahooFinanceClient::new()),
        assistant,
        db,
        connections: ConnectionRegistry::default(),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "stock dashboard API listening");
    axum::serve(listener, router(state)).await?;

    Ok(())
}
