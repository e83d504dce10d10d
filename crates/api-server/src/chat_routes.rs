//! The AI chat flow: resolve stock context, replay recent history, ask the
//! model, persist the exchange.

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use ollama_client::{build_messages, extract_stock_symbol, HistoryTurn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use yahoo_client::StockQuote;

use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    pub stock_symbol: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub stock_data: Option<StockQuote>,
    pub timestamp: String,
}

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat/history/:session_id", get(get_chat_history))
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    // An explicit symbol wins over scanning the message. Either lookup may
    // fail, in which case the chat proceeds without stock context.
    let stock_data = match &request.stock_symbol {
        Some(symbol) => state.quotes.get_quote(&symbol.to_uppercase()).await.ok(),
        None => match extract_stock_symbol(&request.message) {
            Some(symbol) => state.quotes.get_quote(symbol).await.ok(),
            None => None,
        },
    };

    let history = state.db.chat().recent(&request.session_id, 5).await?;
    let turns: Vec<HistoryTurn> = history
        .into_iter()
        .map(|turn| HistoryTurn {
            user_message: turn.user_message,
            ai_response: turn.ai_response,
        })
        .collect();

    let messages = build_messages(&request.message, stock_data.as_ref(), &turns);
    let response = state.assistant.chat(messages).await;

    state
        .db
        .chat()
        .append(
            &request.session_id,
            &request.message,
            &response,
            stock_data.as_ref().map(|quote| quote.symbol.as_str()),
        )
        .await?;

    Ok(Json(ChatResponse {
        response,
        stock_data,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

async fn get_chat_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let messages = state.db.chat().session_history(&session_id).await?;

    if messages.is_empty() {
        return Err(AppError::NotFound(format!(
            "No chat history for session {}",
            session_id
        )));
    }

    Ok(Json(json!({
        "session_id": session_id,
        "messages": messages
    })))
}
