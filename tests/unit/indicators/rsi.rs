//! Unit tests for the RSI indicator

use optrix::indicators::momentum::calculate_rsi;
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
fn insufficient_data_yields_none() {
    let candles = candles_from_closes(&[100.0; 13]);
    assert!(calculate_rsi(&candles, 14).is_none());
}

#[test]
fn all_gains_pin_rsi_at_100() {
    let closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
    let candles = candles_from_closes(&closes);
    assert_eq!(calculate_rsi(&candles, 14), Some(100.0));
}

#[test]
fn all_losses_pin_rsi_at_0() {
    let closes: Vec<f64> = (0..15).map(|i| 200.0 - i as f64).collect();
    let candles = candles_from_closes(&closes);
    assert_eq!(calculate_rsi(&candles, 14), Some(0.0));
}

#[test]
fn mixed_window_stays_strictly_between_bounds() {
    let closes: Vec<f64> = (0..20)
        .map(|i| if i % 2 == 0 { 100.0 } else { 102.0 })
        .collect();
    let candles = candles_from_closes(&closes);
    let rsi = calculate_rsi(&candles, 14).unwrap();
    assert!(rsi > 0.0 && rsi < 100.0, "rsi was {rsi}");
}

#[test]
fn only_the_trailing_window_counts() {
    // Falling prices outside the window must not affect the result.
    let mut closes: Vec<f64> = (0..10).map(|i| 300.0 - i as f64 * 10.0).collect();
    closes.extend((0..14).map(|i| 210.0 + i as f64));
    let candles = candles_from_closes(&closes);
    assert_eq!(calculate_rsi(&candles, 14), Some(100.0));
}

#[test]
fn flat_window_reads_as_100() {
    // No losses at all, so the zero-average-loss rule applies.
    let candles = candles_from_closes(&[100.0; 15]);
    assert_eq!(calculate_rsi(&candles, 14), Some(100.0));
}
