//! Interval-driven polling over the configured symbols.
//!
//! Stands in for the dashboard's refresh timer: each tick runs a full
//! polling pass per symbol through [`Engine::poll`], which publishes the
//! snapshot consumed by the signal endpoint. Overlap protection lives in
//! the engine's per-symbol in-flight guard; a skipped tick is logged and
//! dropped, never queued.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::core::engine::Engine;
use crate::models::IndexSymbol;

pub struct MarketPoller {
    engine: Arc<Engine>,
    symbols: Vec<IndexSymbol>,
    interval: Duration,
    handle: RwLock<Option<tokio::task::JoinHandle<()>>>,
}

impl MarketPoller {
    pub fn new(engine: Arc<Engine>, symbols: Vec<IndexSymbol>, interval: Duration) -> Self {
        Self {
            engine,
            symbols,
            interval,
            handle: RwLock::new(None),
        }
    }

    /// Spawn the polling loop. The first pass runs immediately.
    pub async fn start(&self) {
        let engine = self.engine.clone();
        let symbols = self.symbols.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = interval.as_secs(), symbols = ?symbols, "poller started");

            loop {
                ticker.tick().await;
                for symbol in &symbols {
                    if let Some(snapshot) = engine.poll(*symbol).await {
                        debug!(
                            symbol = %symbol,
                            price = snapshot.quote.price,
                            live = snapshot.live,
                            "poll tick complete"
                        );
                    }
                }
            }
        });

        *self.handle.write().await = Some(handle);
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("poller stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}
