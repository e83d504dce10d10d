//! Client for a locally hosted Ollama inference endpoint, plus the prompt
//! assembly used by the stock chat flow.

pub mod context;
pub mod extract;

pub use context::{build_messages, stock_context, HistoryTurn, SYSTEM_PROMPT};
pub use extract::{extract_stock_symbol, COMMON_SYMBOLS};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Fallback when the model answers with an empty body.
pub const EMPTY_RESPONSE_MSG: &str = "I couldn't generate a response. Please try again.";

/// Fallback when the inference request times out.
pub const SLOW_RESPONSE_MSG: &str =
    "The AI is taking too long to respond. Please try again with a shorter question.";

/// Fallback when the endpoint refuses the connection.
pub const UNREACHABLE_MSG: &str =
    "Cannot connect to the AI service. Please ensure Ollama is running.";

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// One turn of the wire-level conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Configuration for the inference endpoint.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("OLLAMA_HOST")
                .unwrap_or_else(|_| "http://host.docker.internal:11434".to_string()),
            model: std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "qwen2.5:0.5b".to_string()),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: DecodingOptions,
}

#[derive(Debug, Serialize)]
struct DecodingOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    #[serde(default)]
    name: String,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    host: String,
    model: String,
    timeout: Duration,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Self {
        let client = reqwest::Client::builder()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            host: config.host,
            model: config.model,
            timeout: config.timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One-shot startup probe against the endpoint's model list. The outcome
    /// is logged only; chat requests are attempted regardless.
    pub async fn check_availability(&self) -> bool {
        let url = format!("{}/api/tags", self.host);

        let response = match self
            .client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(host = %self.host, error = %e, "could not connect to Ollama");
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Ollama is not responding properly");
            return false;
        }

        let names: Vec<String> = response
            .json::<TagsResponse>()
            .await
            .map(|tags| tags.models.into_iter().map(|m| m.name).collect())
            .unwrap_or_default();

        let model_base = self.model.split(':').next().unwrap_or(&self.model);
        if names.iter().any(|name| name.contains(model_base)) {
            tracing::info!(model = %self.model, "Ollama client initialized");
        } else {
            tracing::warn!(model = %self.model, available = ?names, "configured model not found on Ollama");
        }

        true
    }

    /// Send the assembled conversation to the model and return its reply.
    ///
    /// Never returns an error: every failure path degrades to a user-facing
    /// string so the chat surface stays up when the model is down.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> String {
        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            options: DecodingOptions {
                temperature: 0.7,
                num_predict: 500,
            },
        };

        let response = match self
            .client
            .post(format!("{}/api/chat", self.host))
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return SLOW_RESPONSE_MSG.to_string(),
            Err(e) if e.is_connect() => return UNREACHABLE_MSG.to_string(),
            Err(e) => {
                tracing::error!(error = %e, "AI service error");
                return format!("I encountered an error processing your request: {}", e);
            }
        };

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), "Ollama API error");
            return format!(
                "I encountered an error. Please make sure Ollama is running with the model '{}'.",
                self.model
            );
        }

        match response.json::<ChatResponse>().await {
            Ok(body) => {
                let content = body.message.map(|m| m.content).unwrap_or_default();
                if content.is_empty() {
                    EMPTY_RESPONSE_MSG.to_string()
                } else {
                    content
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "invalid Ollama response");
                format!("I encountered an error processing your request: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn test_client(host: String, timeout: Duration) -> OllamaClient {
        OllamaClient::new(OllamaConfig {
            host,
            model: "qwen2.5:0.5b".to_string(),
            timeout,
        })
    }

    /// Accepts one connection and answers with a fixed HTTP response.
    async fn one_shot_server(body: &'static str, status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let response = format!(
                    "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
            }
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn timeout_degrades_to_slow_message() {
        // Accept the connection but never answer.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _conn = listener.accept().await;
            std::future::pending::<()>().await;
        });

        let client = test_client(format!("http://{}", addr), Duration::from_millis(200));
        let reply = client.chat(vec![ChatMessage::user("hi")]).await;
        assert_eq!(reply, SLOW_RESPONSE_MSG);
    }

    #[tokio::test]
    async fn connection_refused_degrades_to_unreachable_message() {
        // Bind to grab a free port, then drop the listener so the port refuses.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = test_client(format!("http://{}", addr), Duration::from_secs(5));
        let reply = client.chat(vec![ChatMessage::user("hi")]).await;
        assert_eq!(reply, UNREACHABLE_MSG);
    }

    #[tokio::test]
    async fn empty_model_reply_degrades_to_fixed_message() {
        let host = one_shot_server(
            r#"{"message":{"role":"assistant","content":""}}"#,
            "HTTP/1.1 200 OK",
        )
        .await;

        let client = test_client(host, Duration::from_secs(5));
        let reply = client.chat(vec![ChatMessage::user("hi")]).await;
        assert_eq!(reply, EMPTY_RESPONSE_MSG);
    }

    #[tokio::test]
    async fn error_status_mentions_configured_model() {
        let host = one_shot_server(r#"{"error":"boom"}"#, "HTTP/1.1 500 Internal Server Error").await;

        let client = test_client(host, Duration::from_secs(5));
        let reply = client.chat(vec![ChatMessage::user("hi")]).await;
        assert!(reply.contains("qwen2.5:0.5b"));
    }
}
