use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupertrendIndicator {
    pub value: f64,
    pub direction: TrendDirection,
}

/// Indicator snapshot derived from current symbol state on every read.
///
/// Only `rsi` is a real computation over the candle window. The rest are
/// descriptive placeholders parameterized by the current price and the
/// market-open flag, and must be read as such.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub rsi: f64,
    pub macd: MacdIndicator,
    pub supertrend: SupertrendIndicator,
    pub ema_9: f64,
    pub ema_20: f64,
    pub sma_50: f64,
    pub sma_200: f64,
    /// Put-call ratio.
    pub pcr: f64,
    /// Volatility-index stand-in (India VIX scale).
    pub volatility_index: f64,
}
