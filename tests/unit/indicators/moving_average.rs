//! Unit tests for moving-average helpers

use optrix::indicators::trend::{calculate_sma, ema_blend};
use optrix::models::Candle;

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            Candle::new(i as i64 * 300, close, close + 1.0, close - 1.0, close, 1000)
        })
        .collect()
}

#[test]
fn sma_averages_the_trailing_window() {
    let candles = candles_from_closes(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(calculate_sma(&candles, 3), Some(5.0));
}

#[test]
fn sma_requires_enough_bars() {
    let candles = candles_from_closes(&[1.0, 2.0]);
    assert_eq!(calculate_sma(&candles, 3), None);
}

#[test]
fn ema_blend_uses_standard_weight() {
    // k = 2 / (9 + 1) = 0.2
    let blended = ema_blend(100.0, 90.0, 9);
    assert!((blended - 98.0).abs() < 1e-9);
}

#[test]
fn ema_blend_longer_period_leans_on_price() {
    let fast = ema_blend(100.0, 90.0, 9);
    let slow = ema_blend(100.0, 90.0, 20);
    assert!(slow > fast);
}
