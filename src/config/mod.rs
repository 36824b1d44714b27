//! Environment-driven configuration.

use std::env;
use std::time::Duration;

use crate::models::IndexSymbol;

/// Deployment environment name, from `OPTRIX_ENV` (default "sandbox").
pub fn get_environment() -> String {
    env::var("OPTRIX_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub port: u16,
    /// Seconds between polling passes over the configured symbols.
    pub poll_interval_seconds: u64,
    /// Artificial latency applied to simulated reads.
    pub simulated_latency_ms: u64,
    pub symbols: Vec<IndexSymbol>,
    /// Credential for the generative endpoint. `None` leaves the oracle
    /// unconfigured and the advisory client in its degraded mode.
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            port: 8080,
            poll_interval_seconds: 30,
            simulated_latency_ms: 300,
            symbols: IndexSymbol::ALL.to_vec(),
            gemini_api_key: None,
            gemini_base_url: crate::ai::client::DEFAULT_BASE_URL.to_string(),
            gemini_model: crate::ai::client::DEFAULT_MODEL.to_string(),
        }
    }
}

impl Config {
    /// Load from the process environment, falling back to defaults.
    /// Reads `.env` first when present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self {
            environment: get_environment(),
            ..Self::default()
        };

        if let Some(port) = parse_var("PORT") {
            config.port = port;
        }
        if let Some(interval) = parse_var("POLL_INTERVAL_SECONDS") {
            config.poll_interval_seconds = interval;
        }
        if let Some(latency) = parse_var("SIMULATED_LATENCY_MS") {
            config.simulated_latency_ms = latency;
        }
        if let Ok(key) = env::var("GEMINI_API_KEY") {
            if !key.trim().is_empty() {
                config.gemini_api_key = Some(key);
            }
        }
        if let Ok(base_url) = env::var("GEMINI_BASE_URL") {
            if !base_url.trim().is_empty() {
                config.gemini_base_url = base_url;
            }
        }
        if let Ok(model) = env::var("GEMINI_MODEL") {
            if !model.trim().is_empty() {
                config.gemini_model = model;
            }
        }

        config
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
