use std::sync::Arc;
use std::time::{Duration, Instant};

use axum_test::TestServer;
use chrono::{Local, TimeZone};
use optrix::ai::{Advisor, GenAiClient};
use optrix::core::engine::Engine;
use optrix::core::http::{create_router, AppState, HealthStatus};
use optrix::metrics::Metrics;
use optrix::simulator::{FixedClock, MarketSimulator};
use serde_json::json;
use tokio::sync::RwLock;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_MODEL: &str = "gemini-test";

/// Helper structure bundling together the HTTP server and mocked
/// dependencies.
#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub engine: Arc<Engine>,
    pub metrics: Arc<Metrics>,
    pub genai: MockServer,
    pub clock: Arc<FixedClock>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_market_open(true).await
    }

    pub async fn with_market_open(open: bool) -> Self {
        let genai = MockServer::start().await;
        let (hour, minute) = if open { (10, 0) } else { (18, 0) };
        let clock = Arc::new(FixedClock::at(
            Local.with_ymd_and_hms(2026, 8, 5, hour, minute, 0).unwrap(),
        ));

        let client = GenAiClient::with_client(
            genai.uri(),
            "test-key",
            TEST_MODEL,
            reqwest::Client::new(),
        );

        // No oracle wired up: quote reads stay simulated and
        // deterministic; the advisory path goes to the mock server.
        let simulator = MarketSimulator::new()
            .with_clock(clock.clone())
            .with_seed(99)
            .with_latency(Duration::ZERO);

        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let engine = Arc::new(Engine::with_clock(
            simulator,
            Advisor::new(Some(client)),
            metrics.clone(),
            clock.clone(),
        ));

        let state = AppState {
            engine: engine.clone(),
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
        };
        let server = TestServer::new(create_router(state)).expect("start test server");

        Self {
            server,
            engine,
            metrics,
            genai,
            clock,
        }
    }
}

pub fn generate_content_path() -> String {
    format!("/v1beta/models/{TEST_MODEL}:generateContent")
}

/// Mount a generateContent mock whose reply text is the given advisory
/// JSON, wrapped in the endpoint's candidate envelope.
pub async fn mock_advisory_reply(server: &MockServer, reply: serde_json::Value) {
    mock_raw_reply(server, reply.to_string()).await;
}

/// Mount a generateContent mock returning arbitrary reply text.
pub async fn mock_raw_reply(server: &MockServer, text: String) {
    let envelope = json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    });

    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope))
        .mount(server)
        .await;
}

/// Mount a generateContent mock failing with the given HTTP status.
pub async fn mock_failure(server: &MockServer, status: u16) {
    Mock::given(method("POST"))
        .and(path(generate_content_path()))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
