use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Tracked index symbols. The engine owns one mutable market state per
/// variant and nothing else; there is no dynamic symbol registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexSymbol {
    #[serde(rename = "NIFTY 50")]
    Nifty50,
    #[serde(rename = "SENSEX")]
    Sensex,
}

impl IndexSymbol {
    pub const ALL: [IndexSymbol; 2] = [IndexSymbol::Nifty50, IndexSymbol::Sensex];

    /// URL-safe identifier used in API paths.
    pub fn slug(&self) -> &'static str {
        match self {
            IndexSymbol::Nifty50 => "nifty50",
            IndexSymbol::Sensex => "sensex",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            IndexSymbol::Nifty50 => "NIFTY 50",
            IndexSymbol::Sensex => "SENSEX",
        }
    }
}

impl fmt::Display for IndexSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for IndexSymbol {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "nifty50" | "nifty" => Ok(IndexSymbol::Nifty50),
            "sensex" => Ok(IndexSymbol::Sensex),
            _ => Err(UnknownSymbol(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSymbol(pub String);

impl fmt::Display for UnknownSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown index symbol: {}", self.0)
    }
}

impl std::error::Error for UnknownSymbol {}

/// Point-in-time quote for an index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexQuote {
    pub symbol: IndexSymbol,
    pub price: f64,
    /// Absolute change against the previous session close.
    pub change: f64,
    /// Percentage change against the previous session close.
    pub p_change: f64,
    pub last_updated: DateTime<Utc>,
}

/// Single OHLCV bar. `time` is unix seconds of the bar open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume: Some(volume),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
}

/// One strike row on one side of the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionLeg {
    pub strike: f64,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    /// Last traded premium.
    pub ltp: f64,
    pub open_interest: u64,
    pub implied_vol: f64,
    pub delta: f64,
    pub theta: f64,
    pub oi_change: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionChain {
    pub symbol: IndexSymbol,
    pub expiry_date: NaiveDate,
    pub underlying_price: f64,
    pub calls: Vec<OptionLeg>,
    pub puts: Vec<OptionLeg>,
}

impl OptionChain {
    /// Strike carrying the largest open interest on the call side, read as
    /// a resistance hint.
    pub fn max_call_oi_strike(&self) -> Option<f64> {
        Self::max_oi_strike(&self.calls)
    }

    /// Strike carrying the largest open interest on the put side, read as
    /// a support hint.
    pub fn max_put_oi_strike(&self) -> Option<f64> {
        Self::max_oi_strike(&self.puts)
    }

    fn max_oi_strike(legs: &[OptionLeg]) -> Option<f64> {
        legs.iter()
            .max_by_key(|leg| leg.open_interest)
            .map(|leg| leg.strike)
    }
}
