use ollama_client::OllamaConfig;
use std::env;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub database_url: String,
    pub ollama: OllamaConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8000);

        Self {
            bind_addr: format!("{}:{}", host, port),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:stock_dashboard.db".to_string()),
            ollama: OllamaConfig::default(),
        }
    }
}
