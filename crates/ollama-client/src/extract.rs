//! Ticker detection over free text.

/// Symbols the chat flow knows how to look up without an explicit hint.
pub const COMMON_SYMBOLS: &[&str] = &[
    "AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "META", "NVDA", "JPM", "V", "WMT",
];

/// Return the first known ticker mentioned in the message.
///
/// This is a case-insensitive substring scan, not tokenization: a message
/// containing "V" inside an unrelated word still matches the "V" ticker.
/// Known limitation, kept deliberately.
pub fn extract_stock_symbol(message: &str) -> Option<&'static str> {
    let upper = message.to_uppercase();
    COMMON_SYMBOLS
        .iter()
        .copied()
        .find(|symbol| upper.contains(symbol))
}
