//! Small numeric helpers shared by the simulator and indicators.

/// Round to two decimals, the precision quoted prices are reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Arithmetic mean over a window, `None` when the slice is shorter than
/// the requested period.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}
