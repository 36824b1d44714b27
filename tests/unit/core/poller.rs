//! Unit tests for the market poller

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone};
use optrix::ai::Advisor;
use optrix::core::engine::Engine;
use optrix::core::poller::MarketPoller;
use optrix::metrics::Metrics;
use optrix::models::IndexSymbol;
use optrix::simulator::{FixedClock, MarketSimulator};

fn test_engine() -> Arc<Engine> {
    let clock = Arc::new(FixedClock::at(
        Local.with_ymd_and_hms(2026, 8, 5, 10, 0, 0).unwrap(),
    ));
    let simulator = MarketSimulator::new()
        .with_clock(clock.clone())
        .with_seed(5)
        .with_latency(Duration::ZERO);
    let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
    Arc::new(Engine::with_clock(
        simulator,
        Advisor::new(None),
        metrics,
        clock,
    ))
}

#[tokio::test]
async fn first_tick_runs_immediately() {
    let engine = test_engine();
    let poller = MarketPoller::new(
        engine.clone(),
        vec![IndexSymbol::Nifty50],
        Duration::from_secs(30),
    );
    poller.start().await;

    // The first interval tick fires at once; wait for the snapshot.
    let mut snapshot = None;
    for _ in 0..50 {
        snapshot = engine.snapshot(IndexSymbol::Nifty50).await;
        if snapshot.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(snapshot.is_some(), "poller never published a snapshot");

    poller.stop().await;
    assert!(!poller.is_running().await);
}

#[tokio::test]
async fn start_and_stop_toggle_the_running_state() {
    let engine = test_engine();
    let poller = MarketPoller::new(engine, vec![], Duration::from_secs(30));

    assert!(!poller.is_running().await);
    poller.start().await;
    assert!(poller.is_running().await);
    poller.stop().await;
    assert!(!poller.is_running().await);
}
