//! Option-chain synthesis.

use chrono::NaiveDate;
use rand::Rng;

use crate::common::math::round2;
use crate::models::{OptionChain, OptionLeg, OptionType};

use super::state::SymbolSpec;

/// Strikes per side, centered on the rounded central strike.
const STRIKES_PER_SIDE: i64 = 7;

/// Premiums never quote below this floor.
const MIN_PREMIUM: f64 = 0.1;

pub fn generate_chain<R: Rng>(
    spec: &SymbolSpec,
    expiry_date: NaiveDate,
    underlying_price: f64,
    market_open: bool,
    rng: &mut R,
) -> OptionChain {
    let central_strike =
        (underlying_price / spec.central_strike_step).round() * spec.central_strike_step;
    let strikes: Vec<f64> = (0..STRIKES_PER_SIDE)
        .map(|i| central_strike + (i - STRIKES_PER_SIDE / 2) as f64 * spec.strike_spacing)
        .collect();

    let calls = strikes
        .iter()
        .map(|&strike| generate_leg(strike, OptionType::Call, underlying_price, market_open, rng))
        .collect();
    let puts = strikes
        .iter()
        .map(|&strike| generate_leg(strike, OptionType::Put, underlying_price, market_open, rng))
        .collect();

    OptionChain {
        symbol: spec.symbol,
        expiry_date,
        underlying_price: round2(underlying_price),
        calls,
        puts,
    }
}

fn generate_leg<R: Rng>(
    strike: f64,
    option_type: OptionType,
    underlying: f64,
    market_open: bool,
    rng: &mut R,
) -> OptionLeg {
    let (intrinsic, out_of_the_money, base_delta) = match option_type {
        OptionType::Call => (underlying - strike, strike > underlying, 0.5),
        OptionType::Put => (strike - underlying, strike < underlying, -0.5),
    };

    // Random time value, damped for out-of-the-money strikes.
    let damp = if out_of_the_money { 0.5 } else { 1.0 };
    let time_value = (rng.gen::<f64>() * 20.0 + 5.0) * damp;
    let mut ltp = (intrinsic + time_value).max(MIN_PREMIUM);

    // Premiums barely move outside trading hours.
    let jitter = if market_open { 0.1 } else { 0.01 };
    ltp *= 1.0 + (rng.gen::<f64>() - 0.5) * jitter;

    // No open-interest activity may appear while the market is closed.
    let oi_change = if market_open {
        ((rng.gen::<f64>() - 0.5) * 20_000.0).floor() as i64
    } else {
        0
    };

    OptionLeg {
        strike,
        option_type,
        ltp: round2(ltp),
        open_interest: 100_000 + (rng.gen::<f64>() * 150_000.0).floor() as u64,
        implied_vol: round2(12.0 + rng.gen::<f64>() * 5.0),
        delta: round2(base_delta + (rng.gen::<f64>() - 0.5) * 0.2),
        theta: round2(-(3.0 + rng.gen::<f64>() * 4.0)),
        oi_change,
    }
}
