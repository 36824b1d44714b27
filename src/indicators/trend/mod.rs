pub mod moving_average;

pub use moving_average::{calculate_sma, ema_blend};
