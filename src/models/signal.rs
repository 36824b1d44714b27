use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalStatus {
    Pending,
    Active,
    TargetHit,
    SlHit,
    Closed,
}

/// A fully specified option trade recommendation.
///
/// Created only from a validated advisory reply carrying the complete
/// price triple; the market simulator never writes one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSignal {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Instrument label, e.g. "NIFTY 50 2026-08-27 24900 CE".
    pub instrument: String,
    pub action: TradeAction,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss_price: f64,
    pub status: SignalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_confidence: Option<f64>,
}

/// Trade fields extracted from an advisory reply, before the engine has
/// assigned an id and timestamp. Status is always `Pending` here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeDraft {
    pub instrument: String,
    pub action: TradeAction,
    pub entry_price: f64,
    pub target_price: f64,
    pub stop_loss_price: f64,
    pub status: SignalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_confidence: Option<f64>,
}

/// What the advisory client hands back for every request: a direction
/// label and reasoning in all cases, plus a draft trade when the reply
/// carried the full recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisoryResponse {
    pub market_direction: String,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade: Option<TradeDraft>,
}

impl AdvisoryResponse {
    pub fn narrative(direction: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self {
            market_direction: direction.into(),
            reasoning: reasoning.into(),
            trade: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.market_direction == "Error"
    }
}
