//! optrix: simulated options-market engine for Indian index derivatives.
//!
//! Serves plausible quotes, candlestick windows, option chains and
//! technical-indicator snapshots for NIFTY 50 and SENSEX without a market
//! connection, preferring a live quote from a generative-AI oracle when
//! one is configured, and turns market snapshots into AI trade
//! advisories.

pub mod ai;
pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod simulator;
