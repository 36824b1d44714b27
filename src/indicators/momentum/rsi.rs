//! RSI (Relative Strength Index) indicator
//!
//! RSI = 100 - (100 / (1 + RS))
//! RS = Average Gain / Average Loss

use crate::models::Candle;

/// Calculate RSI over the trailing `period` candles.
///
/// Returns `None` when the window is shorter than `period`. Boundary
/// rule: zero average loss yields exactly 100, zero average gain (with a
/// nonzero loss) yields exactly 0.
pub fn calculate_rsi(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }

    let start = candles.len() - period;
    let mut gains = 0.0;
    let mut losses = 0.0;

    for i in start..candles.len() {
        // The very first bar of the window has no predecessor; measure it
        // against its own open instead.
        let baseline = if i > 0 {
            candles[i - 1].close
        } else {
            candles[i].open
        };
        let change = candles[i].close - baseline;
        if change > 0.0 {
            gains += change;
        } else {
            losses += change.abs();
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    if avg_gain == 0.0 {
        return Some(0.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}
