//! Prometheus metrics for the HTTP surface and the engine.

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry, TextEncoder,
};

pub struct Metrics {
    registry: Registry,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
    /// Index-quote reads that fell back to local simulation.
    pub oracle_fallbacks_total: IntCounter,
    pub advisory_requests_total: IntCounter,
    /// Advisory requests that produced an error-direction narrative.
    pub advisory_failures_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_requests_total = IntCounter::with_opts(Opts::new(
            "http_requests_total",
            "Total number of HTTP requests",
        ))?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::with_opts(Opts::new(
            "http_requests_in_flight",
            "HTTP requests currently being served",
        ))?;
        let oracle_fallbacks_total = IntCounter::with_opts(Opts::new(
            "oracle_fallbacks_total",
            "Quote reads served from simulation after an oracle failure",
        ))?;
        let advisory_requests_total = IntCounter::with_opts(Opts::new(
            "advisory_requests_total",
            "Advisory signal requests accepted by the engine",
        ))?;
        let advisory_failures_total = IntCounter::with_opts(Opts::new(
            "advisory_failures_total",
            "Advisory signal requests that ended in an error narrative",
        ))?;

        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;
        registry.register(Box::new(oracle_fallbacks_total.clone()))?;
        registry.register(Box::new(advisory_requests_total.clone()))?;
        registry.register(Box::new(advisory_failures_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
            oracle_fallbacks_total,
            advisory_requests_total,
            advisory_failures_total,
        })
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
