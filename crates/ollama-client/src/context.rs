//! Prompt assembly: a fixed system instruction, a bounded history window,
//! and an optional structured stock block ahead of the user's question.

use yahoo_client::StockQuote;

use crate::ChatMessage;

pub const SYSTEM_PROMPT: &str = "You are a helpful stock market assistant. You provide:
1. Clear, accurate information about stocks
2. Analysis of stock performance and trends
3. Explanations of stock market concepts
4. Investment insights (but NOT financial advice)

Always remind users that you're providing information, not financial advice, and they should do their own research or consult a financial advisor.

Be concise but informative. Use the stock data provided to give context-aware answers.";

/// How many prior turns are replayed into the prompt.
const HISTORY_WINDOW: usize = 5;

/// One stored conversation turn, as replayed into the prompt.
#[derive(Debug, Clone)]
pub struct HistoryTurn {
    pub user_message: String,
    pub ai_response: String,
}

/// Assemble the ordered message list for the model: system instruction,
/// the last [`HISTORY_WINDOW`] turns oldest-first, then the current user
/// message, prefixed with the rendered stock block when a snapshot is given.
pub fn build_messages(
    user_message: &str,
    stock: Option<&StockQuote>,
    history: &[HistoryTurn],
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    for turn in &history[start..] {
        messages.push(ChatMessage::user(&turn.user_message));
        messages.push(ChatMessage::assistant(&turn.ai_response));
    }

    let content = match stock {
        Some(quote) => format!("{}\n\nUser Question: {}", stock_context(quote), user_message),
        None => user_message.to_string(),
    };
    messages.push(ChatMessage::user(content));

    messages
}

/// Render a snapshot as the fixed-format context block. Missing fields show
/// as a literal "N/A"; volume and market cap get thousands separators.
pub fn stock_context(quote: &StockQuote) -> String {
    format!(
        "\nCurrent Stock Information:\n\
         - Symbol: {}\n\
         - Company: {}\n\
         - Current Price: ${}\n\
         - Change: {}%\n\
         - Volume: {}\n\
         - Market Cap: ${}\n\
         - Day High: ${}\n\
         - Day Low: ${}\n\
         - P/E Ratio: {}\n\
         - Beta: {}\n",
        quote.symbol,
        quote.company_name,
        quote.price,
        quote.change_percent,
        format_thousands(quote.volume),
        format_thousands(quote.market_cap),
        optional_field(quote.day_high),
        optional_field(quote.day_low),
        optional_field(quote.pe_ratio),
        optional_field(quote.beta),
    )
}

fn optional_field(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "N/A".to_string(),
    }
}

/// Group digits in threes: 50000000 -> "50,000,000".
pub fn format_thousands(n: i64) -> String {
    let digits: Vec<char> = n.unsigned_abs().to_string().chars().collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if n < 0 {
        out.push('-');
    }
    for (i, digit) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*digit);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn quote() -> StockQuote {
        StockQuote {
            symbol: "AAPL".to_string(),
            company_name: "Apple Inc.".to_string(),
            price: 175.5,
            change_percent: 1.25,
            volume: 50_000_000,
            market_cap: 2_700_000_000_000,
            timestamp: Utc::now(),
            previous_close: Some(173.3),
            open: Some(174.0),
            day_high: Some(176.3),
            day_low: Some(173.1),
            year_high: Some(199.6),
            year_low: Some(142.0),
            pe_ratio: None,
            eps: Some(6.13),
            dividend_yield: Some(0.55),
            beta: Some(1.29),
            avg_volume: Some(58_000_000),
            sector: Some("Technology".to_string()),
            industry: None,
            description: None,
        }
    }

    fn turn(i: usize) -> HistoryTurn {
        HistoryTurn {
            user_message: format!("question {}", i),
            ai_response: format!("answer {}", i),
        }
    }

    #[test]
    fn format_thousands_groups_digits() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1_000), "1,000");
        assert_eq!(format_thousands(50_000_000), "50,000,000");
        assert_eq!(format_thousands(2_700_000_000_000), "2,700,000,000,000");
        assert_eq!(format_thousands(-1_234_567), "-1,234,567");
    }

    #[test]
    fn context_block_renders_missing_fields_as_na() {
        let block = stock_context(&quote());
        assert!(block.contains("- P/E Ratio: N/A"));
        assert!(block.contains("- Volume: 50,000,000"));
        assert!(block.contains("- Market Cap: $2,700,000,000,000"));
        assert!(block.contains("- Day High: $176.3"));
    }

    #[test]
    fn history_is_capped_to_last_five_oldest_first() {
        let history: Vec<HistoryTurn> = (1..=7).map(turn).collect();
        let messages = build_messages("latest", None, &history);

        // system + 5 user/assistant pairs + final user turn
        assert_eq!(messages.len(), 12);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].content, "question 3");
        assert_eq!(messages[2].content, "answer 3");
        assert_eq!(messages[9].content, "question 7");
        assert_eq!(messages[10].content, "answer 7");
        assert_eq!(messages[11].content, "latest");
    }

    #[test]
    fn snapshot_prefixes_the_final_user_turn() {
        let messages = build_messages("What do you think?", Some(&quote()), &[]);

        assert_eq!(messages.len(), 2);
        let last = &messages[1];
        assert_eq!(last.role, "user");
        assert!(last.content.starts_with("\nCurrent Stock Information:"));
        assert!(last.content.ends_with("User Question: What do you think?"));
    }

    #[test]
    fn without_snapshot_the_raw_message_is_sent() {
        let messages = build_messages("hello", None, &[]);
        assert_eq!(messages[1].content, "hello");
    }
}
