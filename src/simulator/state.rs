//! Per-symbol mutable market state and its seed data.

use std::collections::VecDeque;

use crate::models::{Candle, IndexSymbol};

/// Candle window cap; the oldest bar is evicted on overflow.
pub const MAX_CANDLES: usize = 50;

/// Static parameters of one tradable index.
#[derive(Debug, Clone, Copy)]
pub struct SymbolSpec {
    pub symbol: IndexSymbol,
    pub seed_price: f64,
    pub seed_change: f64,
    /// Rounding step for the central strike of the option chain.
    pub central_strike_step: f64,
    /// Distance between adjacent strikes.
    pub strike_spacing: f64,
    /// Scale of the simulated per-poll price perturbation.
    pub movement_factor: f64,
}

const NIFTY_SPEC: SymbolSpec = SymbolSpec {
    symbol: IndexSymbol::Nifty50,
    seed_price: 24793.00,
    seed_change: 125.50,
    central_strike_step: 50.0,
    strike_spacing: 100.0,
    movement_factor: 0.0003,
};

const SENSEX_SPEC: SymbolSpec = SymbolSpec {
    symbol: IndexSymbol::Sensex,
    seed_price: 81361.00,
    seed_change: 210.30,
    central_strike_step: 100.0,
    strike_spacing: 200.0,
    movement_factor: 0.00025,
};

pub fn spec_for(symbol: IndexSymbol) -> &'static SymbolSpec {
    match symbol {
        IndexSymbol::Nifty50 => &NIFTY_SPEC,
        IndexSymbol::Sensex => &SENSEX_SPEC,
    }
}

/// Seed bars on the NIFTY 50 price scale: (open, high, low, close, volume).
/// Other symbols scale these by their seed-price ratio.
const SEED_BARS: [(f64, f64, f64, f64, u64); 5] = [
    (24750.0, 24780.0, 24730.0, 24770.0, 100_000),
    (24770.0, 24810.0, 24760.0, 24800.0, 120_000),
    (24800.0, 24805.0, 24775.0, 24780.0, 90_000),
    (24780.0, 24820.0, 24770.0, 24793.0, 110_000),
    (24793.0, 24830.0, 24790.0, 24805.0, 105_000),
];

const SEED_BAR_SECONDS: i64 = 300;

/// In-memory market state for one symbol. Lives for the process lifetime;
/// `price` is advanced only by the simulator's own step function or
/// overwritten by a successful oracle read.
#[derive(Debug, Clone)]
pub struct SymbolState {
    pub price: f64,
    pub previous_close: f64,
    pub candles: VecDeque<Candle>,
    /// Last price observed while the market was open. Reported verbatim
    /// whenever the market is closed, so closed-market reads stay stable.
    pub last_market_close_price: f64,
}

impl SymbolState {
    /// Seed state for a symbol, with the candle window ending at the most
    /// recent bar boundary before `now_unix`.
    pub fn seed(spec: &SymbolSpec, now_unix: i64) -> Self {
        let scale = spec.seed_price / NIFTY_SPEC.seed_price;
        let aligned = now_unix - now_unix.rem_euclid(SEED_BAR_SECONDS);

        let candles = SEED_BARS
            .iter()
            .enumerate()
            .map(|(i, &(open, high, low, close, volume))| {
                let offset = (SEED_BARS.len() - 1 - i) as i64 * SEED_BAR_SECONDS;
                Candle::new(
                    aligned - offset,
                    open * scale,
                    high * scale,
                    low * scale,
                    close * scale,
                    volume,
                )
            })
            .collect();

        Self {
            price: spec.seed_price,
            previous_close: spec.seed_price - spec.seed_change,
            candles,
            last_market_close_price: spec.seed_price,
        }
    }
}
