//! Unit tests for index-quote fetches and the oracle fallback

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, TimeZone};
use optrix::models::IndexSymbol;
use optrix::simulator::{
    FixedClock, LiveQuote, MarketSimulator, OracleError, QuoteOracle, QuoteOrigin,
};
use tokio::sync::Mutex;

fn open_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at(
        Local.with_ymd_and_hms(2026, 8, 5, 10, 0, 0).unwrap(),
    ))
}

fn closed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at(
        Local.with_ymd_and_hms(2026, 8, 5, 18, 0, 0).unwrap(),
    ))
}

fn simulator(clock: Arc<FixedClock>) -> MarketSimulator {
    MarketSimulator::new()
        .with_clock(clock)
        .with_seed(42)
        .with_latency(Duration::ZERO)
}

/// Succeeds once, then fails every call.
struct OneShotOracle {
    quote: Mutex<Option<LiveQuote>>,
}

#[async_trait]
impl QuoteOracle for OneShotOracle {
    async fn fetch_live_quote(&self, _symbol: IndexSymbol) -> Result<LiveQuote, OracleError> {
        self.quote
            .lock()
            .await
            .take()
            .ok_or_else(|| OracleError::Transport("oracle offline".to_string()))
    }
}

struct FailingOracle;

#[async_trait]
impl QuoteOracle for FailingOracle {
    async fn fetch_live_quote(&self, _symbol: IndexSymbol) -> Result<LiveQuote, OracleError> {
        Err(OracleError::RateLimited)
    }
}

#[tokio::test]
async fn unconfigured_oracle_reports_simulated_origin() {
    let mut sim = simulator(open_clock());
    let fetch = sim.fetch_index_quote(IndexSymbol::Nifty50).await;
    assert_eq!(
        fetch.origin,
        QuoteOrigin::Simulated(OracleError::NotConfigured)
    );
    assert!(fetch.quote.price > 0.0);
}

#[tokio::test]
async fn closed_market_price_never_drifts() {
    let mut sim = simulator(closed_clock());
    let first = sim.fetch_index_quote(IndexSymbol::Nifty50).await;
    let second = sim.fetch_index_quote(IndexSymbol::Nifty50).await;
    let third = sim.fetch_index_quote(IndexSymbol::Nifty50).await;

    assert_eq!(first.quote.price, second.quote.price);
    assert_eq!(second.quote.price, third.quote.price);
    assert_eq!(first.quote.change, third.quote.change);
    assert_eq!(first.quote.p_change, third.quote.p_change);
}

#[tokio::test]
async fn change_is_measured_against_previous_close() {
    let mut sim = simulator(open_clock());
    let fetch = sim.fetch_index_quote(IndexSymbol::Sensex).await;
    let expected_previous_close = 81361.00 - 210.30;
    let expected = fetch.quote.price - expected_previous_close;
    assert!((fetch.quote.change - expected).abs() < 0.01);
}

#[tokio::test]
async fn open_market_perturbation_stays_bounded() {
    let mut sim = simulator(open_clock());
    let mut price = 24793.00;
    for _ in 0..20 {
        let fetch = sim.fetch_index_quote(IndexSymbol::Nifty50).await;
        // Per-step movement is at most factor * 20 / 2 of the prior price.
        let bound = price * 0.0003 * 10.0 + 0.01;
        assert!((fetch.quote.price - price).abs() <= bound);
        price = fetch.quote.price;
    }
}

#[tokio::test]
async fn live_quote_overwrites_state_and_freezes_after_close() {
    let clock = open_clock();
    let oracle = Arc::new(OneShotOracle {
        quote: Mutex::new(Some(LiveQuote {
            price: 25_100.50,
            previous_close: 25_000.00,
        })),
    });
    let mut sim = simulator(clock.clone()).with_oracle(oracle);

    let live = sim.fetch_index_quote(IndexSymbol::Nifty50).await;
    assert_eq!(live.origin, QuoteOrigin::Live);
    assert_eq!(live.quote.price, 25_100.50);
    assert_eq!(live.quote.change, 100.50);

    // Oracle is now failing and the market has closed: the fallback must
    // report the last live price verbatim.
    clock.set(Local.with_ymd_and_hms(2026, 8, 5, 18, 0, 0).unwrap());
    let fallback = sim.fetch_index_quote(IndexSymbol::Nifty50).await;
    assert!(matches!(
        fallback.origin,
        QuoteOrigin::Simulated(OracleError::Transport(_))
    ));
    assert_eq!(fallback.quote.price, 25_100.50);
}

#[tokio::test]
async fn oracle_failure_never_surfaces_as_error() {
    let mut sim = simulator(closed_clock()).with_oracle(Arc::new(FailingOracle));
    let fetch = sim.fetch_index_quote(IndexSymbol::Nifty50).await;
    assert_eq!(fetch.origin, QuoteOrigin::Simulated(OracleError::RateLimited));
    assert_eq!(fetch.quote.price, 24793.00);
}

#[tokio::test]
async fn symbols_do_not_share_state() {
    let mut sim = simulator(open_clock());
    let nifty = sim.fetch_index_quote(IndexSymbol::Nifty50).await;
    let sensex = sim.fetch_index_quote(IndexSymbol::Sensex).await;
    assert!(nifty.quote.price < 30_000.0);
    assert!(sensex.quote.price > 70_000.0);
}
