//! Live-quote oracle backed by the generative endpoint.
//!
//! The model is asked for a strict two-line numeric reply; anything that
//! does not match the format is an [`OracleError::UnexpectedFormat`],
//! which the simulator treats like any other oracle failure.

use async_trait::async_trait;
use tracing::debug;

use crate::models::IndexSymbol;
use crate::simulator::{LiveQuote, OracleError, QuoteOracle};

use super::client::{GenAiClient, GenAiError, GenerationConfig};

pub struct GenAiQuoteOracle {
    client: GenAiClient,
}

impl GenAiQuoteOracle {
    pub fn new(client: GenAiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QuoteOracle for GenAiQuoteOracle {
    async fn fetch_live_quote(&self, symbol: IndexSymbol) -> Result<LiveQuote, OracleError> {
        let prompt = live_quote_prompt(symbol);
        let text = self
            .client
            .generate(&prompt, &GenerationConfig::factual())
            .await
            .map_err(|err| match err {
                GenAiError::RateLimited => OracleError::RateLimited,
                GenAiError::EmptyReply => OracleError::UnexpectedFormat,
                other => OracleError::Transport(other.to_string()),
            })?;

        debug!(symbol = %symbol, reply = %text, "live quote reply");
        parse_quote_reply(&text).ok_or(OracleError::UnexpectedFormat)
    }
}

fn live_quote_prompt(symbol: IndexSymbol) -> String {
    format!(
        "What is the current live market price and the previous day's closing price \
for the {symbol} index in India?\n\
Respond in the following format, with only numbers after the colon:\n\
PRICE: <price_as_number>\n\
PREVIOUS_CLOSE: <previous_close_as_number>\n\
Do not include any other text or explanations.\n\
For example:\n\
PRICE: 24850.55\n\
PREVIOUS_CLOSE: 24790.10"
    )
}

/// Parse the fixed two-line reply. Both fields must be present and
/// numeric; thousands separators are stripped.
pub fn parse_quote_reply(text: &str) -> Option<LiveQuote> {
    let price = extract_field(text, "PRICE:")?;
    let previous_close = extract_field(text, "PREVIOUS_CLOSE:")?;
    if price.is_finite() && previous_close.is_finite() {
        Some(LiveQuote {
            price,
            previous_close,
        })
    } else {
        None
    }
}

fn extract_field(text: &str, label: &str) -> Option<f64> {
    for line in text.lines() {
        if let Some(rest) = line.trim().strip_prefix(label) {
            let cleaned: String = rest.trim().chars().filter(|c| *c != ',').collect();
            return cleaned.parse().ok();
        }
    }
    None
}
