//! Optrix API Server
//!
//! HTTP API over the market engine: health check, metrics, market data
//! reads and AI advisory signals. State is in-memory and resets on
//! restart; the background poller keeps snapshots warm for the
//! configured symbols.

use optrix::config::Config;
use optrix::core::http::start_server;
use optrix::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    logging::init_logging();

    info!("Starting Optrix API Server");
    info!(environment = %config.environment, "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
