use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("no quote data found for {0}")]
    NotFound(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream error: {0}")]
    Upstream(String),
}
