//! Market simulator.
//!
//! Produces plausible, internally consistent quotes, candles, option
//! chains and indicator snapshots for a fixed set of index symbols
//! without a market connection. A live quote from the configured
//! [`QuoteOracle`] takes priority when one succeeds; every failure path
//! falls back to local simulation and never surfaces to the caller.

pub mod chain;
pub mod clock;
pub mod expiry;
pub mod hours;
pub mod state;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::common::math::round2;
use crate::indicators::momentum::calculate_rsi;
use crate::indicators::trend::{calculate_sma, ema_blend};
use crate::models::{
    Candle, IndexQuote, IndexSymbol, MacdIndicator, OptionChain, SupertrendIndicator,
    TechnicalIndicators, TrendDirection,
};

pub use clock::{Clock, FixedClock, SystemClock};
pub use state::{spec_for, SymbolSpec, MAX_CANDLES};

/// Default artificial latency for simulated reads. The live-oracle path
/// returns immediately since the oracle call itself is slow.
pub const DEFAULT_SIMULATED_LATENCY: Duration = Duration::from_millis(300);

const RSI_PERIOD: usize = 14;

/// Live price and previous session close reported by the oracle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveQuote {
    pub price: f64,
    pub previous_close: f64,
}

/// External source of live index quotes.
#[async_trait]
pub trait QuoteOracle: Send + Sync {
    async fn fetch_live_quote(&self, symbol: IndexSymbol) -> Result<LiveQuote, OracleError>;
}

/// Why a live quote could not be obtained. Consumed entirely by the
/// simulator's fallback; callers only ever see it as the recorded cause
/// on a simulated quote.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("quote oracle is not configured")]
    NotConfigured,
    #[error("quote oracle is busy")]
    RateLimited,
    #[error("quote oracle reply was not in the expected format")]
    UnexpectedFormat,
    #[error("quote oracle request failed: {0}")]
    Transport(String),
}

/// Where a returned quote came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOrigin {
    /// Overwritten from a successful oracle read.
    Live,
    /// Locally simulated, with the cause that triggered the fallback.
    Simulated(OracleError),
}

impl QuoteOrigin {
    pub fn is_live(&self) -> bool {
        matches!(self, QuoteOrigin::Live)
    }
}

/// Quote plus its provenance, so callers and tests can tell real data
/// from simulated data.
#[derive(Debug, Clone)]
pub struct QuoteFetch {
    pub quote: IndexQuote,
    pub origin: QuoteOrigin,
}

/// Owns one [`state::SymbolState`] per symbol. All mutation happens
/// through the five read operations; wrap the simulator in a mutex to get
/// the single-writer model the state expects.
pub struct MarketSimulator {
    states: HashMap<IndexSymbol, state::SymbolState>,
    rng: StdRng,
    clock: Arc<dyn Clock>,
    oracle: Option<Arc<dyn QuoteOracle>>,
    latency: Duration,
}

impl MarketSimulator {
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            rng: StdRng::from_entropy(),
            clock: Arc::new(SystemClock),
            oracle: None,
            latency: DEFAULT_SIMULATED_LATENCY,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn QuoteOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Fix the random sequence so tests can assert exact outputs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Current quote for `symbol`. Prefers the oracle; any oracle failure
    /// (including "not configured") falls back to simulation without
    /// surfacing an error.
    pub async fn fetch_index_quote(&mut self, symbol: IndexSymbol) -> QuoteFetch {
        if let Some(oracle) = self.oracle.clone() {
            match oracle.fetch_live_quote(symbol).await {
                Ok(live) => return self.apply_live_quote(symbol, live),
                Err(err) => {
                    warn!(symbol = %symbol, error = %err, "live quote unavailable, falling back to simulation");
                    return self.simulated_quote(symbol, err).await;
                }
            }
        }
        self.simulated_quote(symbol, OracleError::NotConfigured).await
    }

    fn apply_live_quote(&mut self, symbol: IndexSymbol, live: LiveQuote) -> QuoteFetch {
        let last_updated = self.clock.now_utc();
        let state = self.state_mut(symbol);
        state.price = live.price;
        state.previous_close = live.previous_close;
        state.last_market_close_price = live.price;

        let change = round2(live.price - live.previous_close);
        let p_change = round2(change / live.previous_close * 100.0);
        info!(symbol = %symbol, price = live.price, "applied live oracle quote");

        QuoteFetch {
            quote: IndexQuote {
                symbol,
                price: live.price,
                change,
                p_change,
                last_updated,
            },
            origin: QuoteOrigin::Live,
        }
    }

    async fn simulated_quote(&mut self, symbol: IndexSymbol, cause: OracleError) -> QuoteFetch {
        let open = hours::is_market_open(self.clock.now());
        let last_updated = self.clock.now_utc();
        let spec = spec_for(symbol);

        self.ensure_state(symbol);
        let Self { states, rng, .. } = self;
        let state = states.get_mut(&symbol).expect("state seeded");

        let price = if open {
            let step = (rng.gen::<f64>() - 0.5) * (state.price * spec.movement_factor * 20.0);
            let mut next = round2(state.price + step);
            if next <= 0.0 {
                next = round2(state.price * 0.99);
            }
            state.price = next;
            state.last_market_close_price = next;
            next
        } else {
            // Frozen at the last open-market price; no drift after hours.
            state.price = state.last_market_close_price;
            state.last_market_close_price
        };

        let change = round2(price - state.previous_close);
        let p_change = round2(change / state.previous_close * 100.0);
        debug!(symbol = %symbol, price, market_open = open, "simulated quote");

        self.simulated_delay().await;
        QuoteFetch {
            quote: IndexQuote {
                symbol,
                price,
                change,
                p_change,
                last_updated,
            },
            origin: QuoteOrigin::Simulated(cause),
        }
    }

    /// Option chain around the market-appropriate underlying price: the
    /// live price while open, the frozen last-close price otherwise.
    pub async fn fetch_option_chain(
        &mut self,
        symbol: IndexSymbol,
        expiry_date: NaiveDate,
    ) -> OptionChain {
        let open = hours::is_market_open(self.clock.now());
        let spec = spec_for(symbol);

        self.ensure_state(symbol);
        let Self { states, rng, .. } = self;
        let state = states.get_mut(&symbol).expect("state seeded");
        let underlying = if open {
            state.price
        } else {
            state.last_market_close_price
        };

        let chain = chain::generate_chain(spec, expiry_date, underlying, open, rng);
        self.simulated_delay().await;
        chain
    }

    /// Rolling candle window for `symbol`. While the market is open, at
    /// most one new bar is appended per call once the wall clock passes
    /// the next bar boundary; missed bars are never back-filled. While
    /// closed, the latest bar is clamped to the last open-market price so
    /// no bar implies after-hours trading.
    pub async fn fetch_candles(&mut self, symbol: IndexSymbol, timeframe: &str) -> Vec<Candle> {
        let now = self.clock.now();
        let open = hours::is_market_open(now);
        let now_unix = now.timestamp();
        let bar_seconds: i64 = if timeframe == "1min" { 60 } else { 300 };

        self.ensure_state(symbol);
        let Self { states, rng, .. } = self;
        let state = states.get_mut(&symbol).expect("state seeded");

        let last = state.candles.back().expect("seeded window is non-empty");
        let next_bar_time = last.time + bar_seconds;

        if open && now_unix >= next_bar_time {
            let bar_open = last.close;
            let bar_close = state.price;
            let high = round2(bar_open.max(bar_close) + rng.gen::<f64>() * bar_open * 0.001);
            let low = round2(bar_open.min(bar_close) - rng.gen::<f64>() * bar_open * 0.001);
            let volume = 80_000 + (rng.gen::<f64>() * 50_000.0).floor() as u64;

            state
                .candles
                .push_back(Candle::new(next_bar_time, bar_open, high, low, bar_close, volume));
            while state.candles.len() > MAX_CANDLES {
                state.candles.pop_front();
            }
        } else if !open {
            let frozen = state.last_market_close_price;
            let last = state.candles.back_mut().expect("seeded window is non-empty");
            if last.close != frozen {
                last.close = frozen;
                last.high = last.high.max(last.open).max(last.close);
                last.low = last.low.min(last.open).min(last.close);
            }
        }

        let window: Vec<Candle> = state.candles.iter().cloned().collect();
        self.simulated_delay().await;
        window
    }

    /// Indicator snapshot recomputed from current state. RSI is a real
    /// computation over the candle window; the remaining values are
    /// descriptive placeholders parameterized by price and session state.
    pub async fn fetch_technical_indicators(
        &mut self,
        symbol: IndexSymbol,
    ) -> TechnicalIndicators {
        let open = hours::is_market_open(self.clock.now());

        self.ensure_state(symbol);
        let Self { states, rng, .. } = self;
        let state = states.get_mut(&symbol).expect("state seeded");

        let price = if open {
            state.price
        } else {
            state.last_market_close_price
        };
        let bars: Vec<Candle> = state.candles.iter().cloned().collect();
        let last_close = bars.last().map(|c| c.close);

        let rsi = round2(calculate_rsi(&bars, RSI_PERIOD).unwrap_or(50.0));

        let macd_raw = (price - state.previous_close * 0.998) * 0.1;
        let signal_raw = (price - state.previous_close * 0.999) * 0.08;
        let macd = MacdIndicator {
            macd_line: round2(macd_raw),
            signal_line: round2(signal_raw),
            histogram: round2(macd_raw - signal_raw),
        };

        let supertrend = SupertrendIndicator {
            value: round2(price * if open && rng.gen::<f64>() > 0.5 { 0.995 } else { 1.005 }),
            direction: if rng.gen::<f64>() > 0.5 {
                TrendDirection::Up
            } else {
                TrendDirection::Down
            },
        };

        let pcr = round2(0.8 + rng.gen::<f64>() * 0.4);
        let vix_band = if open { 5.0 } else { 2.0 };
        let volatility_index = round2(12.0 + rng.gen::<f64>() * vix_band);

        let ema_9 = round2(ema_blend(price, last_close.unwrap_or(price * 0.998), 9));
        let ema_20 = round2(ema_blend(price, last_close.unwrap_or(price * 0.995), 20));
        let sma_50 = round2(calculate_sma(&bars, 50).unwrap_or(price * 0.99));
        let sma_200 = round2(calculate_sma(&bars, 200).unwrap_or(price * 0.98));

        self.simulated_delay().await;
        TechnicalIndicators {
            rsi,
            macd,
            supertrend,
            ema_9,
            ema_20,
            sma_50,
            sma_200,
            pcr,
            volatility_index,
        }
    }

    /// The four nearest expiry dates on or after today, ascending. Always
    /// succeeds.
    pub async fn fetch_available_expiry_dates(&mut self, _symbol: IndexSymbol) -> Vec<NaiveDate> {
        let today = self.clock.now().date_naive();
        let dates = expiry::upcoming_expiries(&expiry::seed_dates(), today);
        self.simulated_delay().await;
        dates
    }

    fn ensure_state(&mut self, symbol: IndexSymbol) {
        if !self.states.contains_key(&symbol) {
            let now_unix = self.clock.unix_seconds();
            self.states
                .insert(symbol, state::SymbolState::seed(spec_for(symbol), now_unix));
        }
    }

    fn state_mut(&mut self, symbol: IndexSymbol) -> &mut state::SymbolState {
        self.ensure_state(symbol);
        self.states.get_mut(&symbol).expect("state seeded")
    }

    async fn simulated_delay(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for MarketSimulator {
    fn default() -> Self {
        Self::new()
    }
}
