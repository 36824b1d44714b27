//! Advisory signal generation.
//!
//! Builds the analysis prompt from a market snapshot, requests a
//! schema-constrained JSON reply, and validates it into an
//! [`AdvisoryResponse`]. This function always returns a renderable
//! result; every failure is folded into a narrative reply with a
//! direction label keyed by cause.

use chrono::DateTime;
use serde_json::{json, Value};
use std::fmt::Write;
use tracing::{debug, warn};

use crate::models::{
    AdvisoryResponse, Candle, IndexQuote, OptionChain, SignalStatus, TechnicalIndicators,
    TradeAction, TradeDraft,
};

use super::client::{GenAiClient, GenAiError, GenerationConfig};
use super::error::AdvisoryError;

/// How many trailing candles the prompt spells out.
const PROMPT_CANDLES: usize = 5;

const NOT_CONFIGURED_REPLY: &str =
    "AI service not available (API key missing). No signal generated.";
const BUSY_REPLY: &str = "AI service is currently busy. Please try again in a moment.";
const INVALID_REPLY: &str = "Received an invalid response from the AI. Please try again.";

pub struct Advisor {
    client: Option<GenAiClient>,
}

impl Advisor {
    /// `None` means no credential was configured; every request then
    /// degrades to the "service not available" narrative.
    pub fn new(client: Option<GenAiClient>) -> Self {
        Self { client }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn generate_signal(
        &self,
        quote: &IndexQuote,
        option_chain: Option<&OptionChain>,
        indicators: &TechnicalIndicators,
        candles: &[Candle],
    ) -> AdvisoryResponse {
        let Some(client) = &self.client else {
            return AdvisoryResponse::narrative("Unclear", NOT_CONFIGURED_REPLY);
        };

        let prompt = build_prompt(quote, option_chain, indicators, candles);
        debug!(symbol = %quote.symbol, prompt_chars = prompt.len(), "requesting advisory signal");

        match request_advisory(client, &prompt).await {
            Ok(response) => response,
            Err(err) => {
                warn!(symbol = %quote.symbol, error = %err, "advisory request failed");
                narrative_for(&err)
            }
        }
    }
}

async fn request_advisory(
    client: &GenAiClient,
    prompt: &str,
) -> Result<AdvisoryResponse, AdvisoryError> {
    let config = GenerationConfig::structured(trade_signal_schema());
    let text = client.generate(prompt, &config).await.map_err(|err| match err {
        GenAiError::RateLimited => AdvisoryError::RateLimited,
        GenAiError::EmptyReply => AdvisoryError::EmptyReply,
        other => AdvisoryError::Transport(other.to_string()),
    })?;
    parse_reply(&text)
}

/// Validate the raw reply. Mandatory fields must be present and
/// non-empty; the reply counts as a full trade recommendation only when
/// instrument, action and the complete price triple are all present.
pub fn parse_reply(text: &str) -> Result<AdvisoryResponse, AdvisoryError> {
    let value: Value = serde_json::from_str(text).map_err(AdvisoryError::InvalidJson)?;

    let direction = non_empty_str(&value, "marketDirectionPrediction");
    let reasoning = non_empty_str(&value, "reasoning");
    let (Some(direction), Some(reasoning)) = (direction, reasoning) else {
        let mut missing = Vec::new();
        if direction.is_none() {
            missing.push("marketDirectionPrediction");
        }
        if reasoning.is_none() {
            missing.push("reasoning");
        }
        return Err(AdvisoryError::MissingFields(missing.join(", ")));
    };

    let instrument = non_empty_str(&value, "instrument");
    let action = non_empty_str(&value, "action");
    let entry_price = value.get("entryPrice").and_then(Value::as_f64);
    let target_price = value.get("targetPrice").and_then(Value::as_f64);
    let stop_loss_price = value.get("stopLossPrice").and_then(Value::as_f64);

    let trade = match (instrument, action, entry_price, target_price, stop_loss_price) {
        (Some(instrument), Some(action), Some(entry), Some(target), Some(stop)) => {
            let action = if action.eq_ignore_ascii_case("BUY") {
                TradeAction::Buy
            } else {
                TradeAction::Sell
            };
            Some(TradeDraft {
                instrument: instrument.to_string(),
                action,
                entry_price: entry,
                target_price: target,
                stop_loss_price: stop,
                status: SignalStatus::Pending,
                ai_confidence: value.get("aiConfidence").and_then(Value::as_f64),
            })
        }
        _ => None,
    };

    Ok(AdvisoryResponse {
        market_direction: direction.to_string(),
        reasoning: reasoning.to_string(),
        trade,
    })
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn narrative_for(err: &AdvisoryError) -> AdvisoryResponse {
    match err {
        AdvisoryError::NotConfigured => AdvisoryResponse::narrative("Unclear", NOT_CONFIGURED_REPLY),
        AdvisoryError::RateLimited => AdvisoryResponse::narrative("Error", BUSY_REPLY),
        AdvisoryError::InvalidJson(_) => AdvisoryResponse::narrative("Error", INVALID_REPLY),
        other => AdvisoryResponse::narrative("Error", format!("Failed to get AI signal: {other}")),
    }
}

pub fn build_prompt(
    quote: &IndexQuote,
    option_chain: Option<&OptionChain>,
    indicators: &TechnicalIndicators,
    candles: &[Candle],
) -> String {
    let mut prompt = format!(
        "You are an expert options trading signal generator for the Indian stock market, \
focusing on {symbol}.\n\
Your analysis is for educational purposes only and not financial advice.\n\
Carefully analyze the following comprehensive market data to determine the likely market \
direction and, if a high-probability setup exists, provide a specific option trade \
recommendation.\n\n\
**1. Current Market Status ({symbol})**\n\
- Live Spot Price: {price:.2}\n\
- Day's Change: {change:.2} ({p_change:.2}%)\n\
- Volatility Index: {vix:.2} (higher values suggest more volatility and higher option premiums)\n\n\
**2. Key Technical Indicators**\n\
- Momentum (RSI 14): {rsi:.2} (above 70 is overbought, below 30 is oversold)\n\
- Trend/Momentum (MACD): Line: {macd:.2}, Signal: {signal:.2}, Histogram: {histogram:.2} \
(positive histogram suggests bullish momentum, negative suggests bearish)\n\
- Trend (Supertrend): {st_dir:?} signal at {st_val:.2} (price above value is bullish, below is bearish)\n\
- Moving Averages:\n\
  - EMA 9: {ema9:.2}\n\
  - EMA 20: {ema20:.2}\n\
  - SMA 50: {sma50:.2}\n\
  - SMA 200: {sma200:.2}\n\n\
**3. Recent Price Action (candlesticks, most recent last)**\n",
        symbol = quote.symbol,
        price = quote.price,
        change = quote.change,
        p_change = quote.p_change,
        vix = indicators.volatility_index,
        rsi = indicators.rsi,
        macd = indicators.macd.macd_line,
        signal = indicators.macd.signal_line,
        histogram = indicators.macd.histogram,
        st_dir = indicators.supertrend.direction,
        st_val = indicators.supertrend.value,
        ema9 = indicators.ema_9,
        ema20 = indicators.ema_20,
        sma50 = indicators.sma_50,
        sma200 = indicators.sma_200,
    );

    let recent = &candles[candles.len().saturating_sub(PROMPT_CANDLES)..];
    for candle in recent {
        let time = DateTime::from_timestamp(candle.time, 0)
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| candle.time.to_string());
        let _ = writeln!(
            prompt,
            "- Time: {}, O: {}, H: {}, L: {}, C: {}",
            time, candle.open, candle.high, candle.low, candle.close
        );
    }
    prompt.push_str(
        "(Analyze the candlestick data for patterns like Doji, Hammer, Engulfing, etc., and \
mention them in your reasoning. These patterns are critical for short-term price direction.)\n\n\
**4. Options Market Sentiment**\n",
    );
    let _ = writeln!(
        prompt,
        "- Put-Call Ratio (PCR): {:.2} (above 1 can be bullish, below 0.7 can be bearish)",
        indicators.pcr
    );

    if let Some(chain) = option_chain {
        if let (Some(call_strike), Some(put_strike)) =
            (chain.max_call_oi_strike(), chain.max_put_oi_strike())
        {
            let _ = writeln!(prompt, "- Max Call OI Strike: {call_strike} (potential resistance)");
            let _ = writeln!(prompt, "- Max Put OI Strike: {put_strike} (potential support)");
        }
    }

    let expiry_hint = option_chain
        .map(|c| c.expiry_date.to_string())
        .unwrap_or_else(|| "YYYY-MM-DD".to_string());
    let _ = write!(
        prompt,
        "\n**5. Analysis Guidance**\n\
Synthesize all data points. A bullish signal is stronger if the price is above the \
Supertrend, the MACD histogram is positive, the RSI is rising (but not overbought), and the \
price is bouncing off a key moving average or a max Put OI support level. A bearish signal \
is the opposite. Look for confirmations across different categories of indicators. Give \
significant weight to recent candlestick patterns as they indicate immediate market \
psychology.\n\n\
**6. Your Task:**\n\
Based on a holistic analysis of all the data provided (price action, indicators, and option \
sentiment):\n\
1. Market Direction Prediction: conclude with \"Bullish\", \"Bearish\", \"Sideways\", or \"Volatile\".\n\
2. Reasoning: provide a concise, step-by-step reasoning explaining how the indicators, \
candle patterns, and price action support your prediction.\n\
3. Trade Signal (optional): if, and ONLY if, a high-probability trade setup is identified, \
recommend a specific option trade. Action must be 'BUY'. The instrument name must be \
precise (e.g., \"{symbol} {expiry} 24900 CE\"). Provide a clear entry price, target price, \
and stop loss price.\n\
4. Confidence Score: if a trade is recommended, provide a confidence score (0-100) based on \
how many factors align.\n\n\
If no clear signal exists, state that and explain why. Ensure your response strictly \
follows the JSON schema.\n",
        symbol = quote.symbol,
        expiry = expiry_hint,
    );

    prompt
}

/// Reply schema sent with every signal request. `marketDirectionPrediction`
/// and `reasoning` are mandatory in every reply; the trade fields only
/// appear when a trade is recommended.
fn trade_signal_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "marketDirectionPrediction": {
                "type": "STRING",
                "description": "The predicted market direction: 'Bullish', 'Bearish', 'Sideways', 'Volatile', or 'Unclear'.",
            },
            "reasoning": {
                "type": "STRING",
                "description": "A brief explanation of the trade setup, logic, or reason for no signal.",
            },
            "instrument": {
                "type": "STRING",
                "description": "The option instrument, e.g., 'NIFTY 50 2026-08-27 24900 CE'. Only present if a trade is recommended.",
            },
            "action": {
                "type": "STRING",
                "description": "'BUY' or 'SELL'. Only present if a trade is recommended.",
                "enum": ["BUY", "SELL"],
            },
            "entryPrice": {
                "type": "NUMBER",
                "description": "Estimated entry premium. Only present if a trade is recommended.",
            },
            "targetPrice": {
                "type": "NUMBER",
                "description": "Estimated target premium. Only present if a trade is recommended.",
            },
            "stopLossPrice": {
                "type": "NUMBER",
                "description": "Estimated stop loss premium. Only present if a trade is recommended.",
            },
            "aiConfidence": {
                "type": "NUMBER",
                "description": "Confidence in the trade from 0 to 100. Only present if a trade is recommended.",
            },
        },
        "required": ["marketDirectionPrediction", "reasoning"],
    })
}
