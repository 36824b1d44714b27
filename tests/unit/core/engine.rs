//! Unit tests for the engine context

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone};
use optrix::ai::Advisor;
use optrix::core::engine::Engine;
use optrix::metrics::Metrics;
use optrix::models::IndexSymbol;
use optrix::simulator::{FixedClock, MarketSimulator};

fn engine(open: bool) -> Engine {
    let (hour, minute) = if open { (10, 0) } else { (18, 0) };
    let clock = Arc::new(FixedClock::at(
        Local.with_ymd_and_hms(2026, 8, 5, hour, minute, 0).unwrap(),
    ));
    let simulator = MarketSimulator::new()
        .with_clock(clock.clone())
        .with_seed(3)
        .with_latency(Duration::ZERO);
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    Engine::with_clock(simulator, Advisor::new(None), metrics, clock)
}

#[tokio::test]
async fn poll_publishes_a_complete_snapshot() {
    let engine = engine(true);
    assert!(engine.snapshot(IndexSymbol::Nifty50).await.is_none());

    let snapshot = engine.poll(IndexSymbol::Nifty50).await.expect("not in flight");
    assert!(!snapshot.candles.is_empty());
    assert_eq!(snapshot.expiries.len(), 4);
    assert_eq!(snapshot.option_chain.calls.len(), 7);
    assert!(!snapshot.live);
    assert!(snapshot.fallback_reason.is_some());

    let stored = engine.snapshot(IndexSymbol::Nifty50).await.unwrap();
    assert_eq!(stored.quote.price, snapshot.quote.price);
}

#[tokio::test]
async fn signal_request_without_data_is_rejected_before_any_call() {
    let engine = engine(true);
    let outcome = engine.generate_signal(IndexSymbol::Nifty50).await;

    assert_eq!(outcome.response.market_direction, "Unclear");
    assert!(outcome
        .response
        .reasoning
        .contains("not available to generate signal"));
    assert!(outcome.signal.is_none());
    assert!(engine.signals().await.is_empty());
}

#[tokio::test]
async fn unconfigured_advisor_degrades_to_narrative() {
    let engine = engine(true);
    engine.poll(IndexSymbol::Nifty50).await;

    let outcome = engine.generate_signal(IndexSymbol::Nifty50).await;
    assert_eq!(outcome.response.market_direction, "Unclear");
    assert!(outcome.response.reasoning.contains("API key missing"));
    assert!(outcome.signal.is_none());
}

#[tokio::test]
async fn polling_twice_keeps_the_closed_market_stable() {
    let engine = engine(false);
    let first = engine.poll(IndexSymbol::Nifty50).await.unwrap();
    let second = engine.poll(IndexSymbol::Nifty50).await.unwrap();

    assert_eq!(first.quote.price, second.quote.price);
    assert_eq!(first.quote.change, second.quote.change);
    assert_eq!(first.quote.p_change, second.quote.p_change);
}

#[tokio::test]
async fn polls_cover_symbols_independently() {
    let engine = engine(true);
    engine.poll(IndexSymbol::Nifty50).await.unwrap();
    assert!(engine.snapshot(IndexSymbol::Sensex).await.is_none());

    engine.poll(IndexSymbol::Sensex).await.unwrap();
    let sensex = engine.snapshot(IndexSymbol::Sensex).await.unwrap();
    assert!(sensex.quote.price > 70_000.0);
}
