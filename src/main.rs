//! Offline demo: drive the simulator through a few reads and print the
//! results. No network, no credential; the quote falls back to simulation.

use std::time::Duration;

use optrix::models::IndexSymbol;
use optrix::simulator::MarketSimulator;

#[tokio::main]
async fn main() {
    let mut simulator = MarketSimulator::new()
        .with_seed(7)
        .with_latency(Duration::ZERO);

    for symbol in IndexSymbol::ALL {
        let fetch = simulator.fetch_index_quote(symbol).await;
        println!("{symbol}:");
        println!(
            "  Price: {:.2} ({:+.2}, {:+.2}%)",
            fetch.quote.price, fetch.quote.change, fetch.quote.p_change
        );
        println!("  Origin: {:?}", fetch.origin);

        let expiries = simulator.fetch_available_expiry_dates(symbol).await;
        println!("  Expiries: {expiries:?}");

        let chain = simulator.fetch_option_chain(symbol, expiries[0]).await;
        println!(
            "  Chain: {} calls / {} puts around {:.2}",
            chain.calls.len(),
            chain.puts.len(),
            chain.underlying_price
        );

        let candles = simulator.fetch_candles(symbol, "5min").await;
        println!("  Candles: {} bars, last close {:.2}", candles.len(), candles.last().unwrap().close);

        let indicators = simulator.fetch_technical_indicators(symbol).await;
        println!(
            "  RSI: {:.2}  MACD hist: {:.2}  PCR: {:.2}",
            indicators.rsi, indicators.macd.histogram, indicators.pcr
        );
        println!();
    }
}
