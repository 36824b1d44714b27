//! Shared engine context: one simulator, one advisor, the latest polled
//! snapshots and the trade-signal history.
//!
//! All simulator access goes through a single async mutex, which gives
//! each read operation the atomic, single-writer semantics the per-symbol
//! state expects. A per-symbol in-flight set keeps a slow polling pass
//! from overlapping the next one.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::ai::Advisor;
use crate::metrics::Metrics;
use crate::models::{
    AdvisoryResponse, Candle, IndexQuote, IndexSymbol, OptionChain, SignalStatus,
    TechnicalIndicators, TradeSignal,
};
use crate::simulator::{Clock, MarketSimulator, QuoteFetch, QuoteOrigin, SystemClock};

/// Most recent signals kept, newest first.
const SIGNAL_HISTORY_CAP: usize = 10;

/// Timeframe the polling pass requests; matches the dashboard chart.
const POLL_TIMEFRAME: &str = "5min";

const INSUFFICIENT_DATA_REPLY: &str =
    "Market data, indicators, or chart data not available to generate signal.";

/// Merged result of one polling pass for one symbol.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub quote: IndexQuote,
    /// Whether the quote came from the live oracle rather than simulation.
    pub live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub candles: Vec<Candle>,
    pub indicators: TechnicalIndicators,
    pub option_chain: OptionChain,
    pub expiries: Vec<NaiveDate>,
    pub fetched_at: DateTime<Utc>,
}

/// What a signal request produced: the advisory reply in all cases, plus
/// the stored signal when the reply carried a full recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct SignalOutcome {
    pub response: AdvisoryResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal: Option<TradeSignal>,
}

pub struct Engine {
    simulator: Mutex<MarketSimulator>,
    advisor: Advisor,
    clock: Arc<dyn Clock>,
    metrics: Arc<Metrics>,
    snapshots: RwLock<HashMap<IndexSymbol, MarketSnapshot>>,
    signals: RwLock<Vec<TradeSignal>>,
    polls_in_flight: Mutex<HashSet<IndexSymbol>>,
}

impl Engine {
    pub fn new(simulator: MarketSimulator, advisor: Advisor, metrics: Arc<Metrics>) -> Self {
        Self::with_clock(simulator, advisor, metrics, Arc::new(SystemClock))
    }

    pub fn with_clock(
        simulator: MarketSimulator,
        advisor: Advisor,
        metrics: Arc<Metrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            simulator: Mutex::new(simulator),
            advisor,
            clock,
            metrics,
            snapshots: RwLock::new(HashMap::new()),
            signals: RwLock::new(Vec::new()),
            polls_in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub async fn quote(&self, symbol: IndexSymbol) -> QuoteFetch {
        let fetch = self.simulator.lock().await.fetch_index_quote(symbol).await;
        if !fetch.origin.is_live() {
            self.metrics.oracle_fallbacks_total.inc();
        }
        fetch
    }

    pub async fn candles(&self, symbol: IndexSymbol, timeframe: &str) -> Vec<Candle> {
        self.simulator
            .lock()
            .await
            .fetch_candles(symbol, timeframe)
            .await
    }

    pub async fn option_chain(&self, symbol: IndexSymbol, expiry: NaiveDate) -> OptionChain {
        self.simulator
            .lock()
            .await
            .fetch_option_chain(symbol, expiry)
            .await
    }

    pub async fn indicators(&self, symbol: IndexSymbol) -> TechnicalIndicators {
        self.simulator
            .lock()
            .await
            .fetch_technical_indicators(symbol)
            .await
    }

    pub async fn expiries(&self, symbol: IndexSymbol) -> Vec<NaiveDate> {
        self.simulator
            .lock()
            .await
            .fetch_available_expiry_dates(symbol)
            .await
    }

    /// Latest polled snapshot for `symbol`, if a pass has completed.
    pub async fn snapshot(&self, symbol: IndexSymbol) -> Option<MarketSnapshot> {
        self.snapshots.read().await.get(&symbol).cloned()
    }

    /// Run one polling pass for `symbol` and publish the snapshot.
    /// Returns `None` when a previous pass for the same symbol is still
    /// in flight; the tick is skipped rather than allowed to interleave.
    pub async fn poll(&self, symbol: IndexSymbol) -> Option<MarketSnapshot> {
        {
            let mut in_flight = self.polls_in_flight.lock().await;
            if !in_flight.insert(symbol) {
                warn!(symbol = %symbol, "previous poll still in flight, skipping");
                return None;
            }
        }

        let snapshot = self.poll_once(symbol).await;
        self.polls_in_flight.lock().await.remove(&symbol);
        Some(snapshot)
    }

    async fn poll_once(&self, symbol: IndexSymbol) -> MarketSnapshot {
        let mut sim = self.simulator.lock().await;

        let expiries = sim.fetch_available_expiry_dates(symbol).await;
        let expiry = expiries.first().copied().expect("expiry list is never empty");
        let fetch = sim.fetch_index_quote(symbol).await;
        let candles = sim.fetch_candles(symbol, POLL_TIMEFRAME).await;
        let indicators = sim.fetch_technical_indicators(symbol).await;
        let option_chain = sim.fetch_option_chain(symbol, expiry).await;
        drop(sim);

        let (live, fallback_reason) = match &fetch.origin {
            QuoteOrigin::Live => (true, None),
            QuoteOrigin::Simulated(cause) => {
                self.metrics.oracle_fallbacks_total.inc();
                (false, Some(cause.to_string()))
            }
        };

        debug!(symbol = %symbol, price = fetch.quote.price, live, "poll complete");
        let snapshot = MarketSnapshot {
            quote: fetch.quote,
            live,
            fallback_reason,
            candles,
            indicators,
            option_chain,
            expiries,
            fetched_at: self.clock.now_utc(),
        };

        self.snapshots
            .write()
            .await
            .insert(symbol, snapshot.clone());
        snapshot
    }

    /// Request an AI advisory for the latest snapshot of `symbol`.
    ///
    /// Rejected before any external call when no usable snapshot exists.
    /// A full recommendation is promoted to an ACTIVE signal with an id
    /// and timestamp and pushed onto the history.
    pub async fn generate_signal(&self, symbol: IndexSymbol) -> SignalOutcome {
        let snapshot = self.snapshot(symbol).await;
        let snapshot = match snapshot {
            Some(s) if !s.candles.is_empty() => s,
            _ => {
                return SignalOutcome {
                    response: AdvisoryResponse::narrative("Unclear", INSUFFICIENT_DATA_REPLY),
                    signal: None,
                }
            }
        };

        self.metrics.advisory_requests_total.inc();
        let response = self
            .advisor
            .generate_signal(
                &snapshot.quote,
                Some(&snapshot.option_chain),
                &snapshot.indicators,
                &snapshot.candles,
            )
            .await;

        if response.is_error() {
            self.metrics.advisory_failures_total.inc();
            return SignalOutcome {
                response,
                signal: None,
            };
        }

        let mut stored = None;
        if let Some(draft) = &response.trade {
            let now = self.clock.now_utc();
            let signal = TradeSignal {
                id: now.timestamp_millis().to_string(),
                timestamp: now,
                instrument: draft.instrument.clone(),
                action: draft.action,
                entry_price: draft.entry_price,
                target_price: draft.target_price,
                stop_loss_price: draft.stop_loss_price,
                status: SignalStatus::Active,
                reasoning: Some(response.reasoning.clone()),
                ai_confidence: draft.ai_confidence,
            };

            let mut signals = self.signals.write().await;
            signals.insert(0, signal.clone());
            signals.truncate(SIGNAL_HISTORY_CAP);
            info!(symbol = %symbol, instrument = %signal.instrument, "trade signal accepted");
            stored = Some(signal);
        }

        SignalOutcome {
            response,
            signal: stored,
        }
    }

    /// Signal history, newest first.
    pub async fn signals(&self) -> Vec<TradeSignal> {
        self.signals.read().await.clone()
    }
}
