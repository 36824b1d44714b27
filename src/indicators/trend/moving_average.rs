//! Moving averages over candle windows.

use crate::common::math;
use crate::models::Candle;

/// Simple moving average of the trailing `period` closes, `None` when the
/// window is too short.
pub fn calculate_sma(candles: &[Candle], period: usize) -> Option<f64> {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    math::sma(&closes, period)
}

/// One-step exponential blend of the live price toward an anchor close,
/// using the standard EMA weight `2 / (period + 1)`.
///
/// This is a price-scaled estimate, not a full EMA over history; the
/// candle window is too short for a seeded long-period EMA.
pub fn ema_blend(price: f64, anchor_close: f64, period: u32) -> f64 {
    let k = 2.0 / (period as f64 + 1.0);
    price * (1.0 - k) + anchor_close * k
}
