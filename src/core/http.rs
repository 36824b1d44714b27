//! HTTP endpoint server using Axum

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::ai::{Advisor, GenAiClient};
use crate::config::Config;
use crate::core::engine::Engine;
use crate::core::poller::MarketPoller;
use crate::metrics::Metrics;
use crate::models::IndexSymbol;
use crate::simulator::{MarketSimulator, QuoteOrigin};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "optrix-market-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

fn parse_symbol(raw: &str) -> Result<IndexSymbol, StatusCode> {
    raw.parse().map_err(|_| StatusCode::NOT_FOUND)
}

#[derive(Debug, Deserialize)]
struct CandlesQuery {
    timeframe: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChainQuery {
    expiry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateSignalRequest {
    symbol: IndexSymbol,
}

async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let symbol = parse_symbol(&symbol)?;
    let fetch = state.engine.quote(symbol).await;

    let (origin, fallback_reason) = match &fetch.origin {
        QuoteOrigin::Live => ("live", None),
        QuoteOrigin::Simulated(cause) => ("simulated", Some(cause.to_string())),
    };
    let mut body = json!({ "quote": fetch.quote, "origin": origin });
    if let Some(reason) = fallback_reason {
        body["fallback_reason"] = json!(reason);
    }
    Ok(Json(body))
}

async fn get_candles(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<CandlesQuery>,
) -> Result<Json<Value>, StatusCode> {
    let symbol = parse_symbol(&symbol)?;
    let timeframe = params.timeframe.as_deref().unwrap_or("5min").to_string();
    let candles = state.engine.candles(symbol, &timeframe).await;
    Ok(Json(json!({ "symbol": symbol, "timeframe": timeframe, "candles": candles })))
}

async fn get_option_chain(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<ChainQuery>,
) -> Result<Json<Value>, StatusCode> {
    let symbol = parse_symbol(&symbol)?;

    let expiry = match params.expiry.as_deref() {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| StatusCode::BAD_REQUEST)?,
        None => state
            .engine
            .expiries(symbol)
            .await
            .first()
            .copied()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?,
    };

    let chain = state.engine.option_chain(symbol, expiry).await;
    Ok(Json(json!(chain)))
}

async fn get_indicators(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let symbol = parse_symbol(&symbol)?;
    let indicators = state.engine.indicators(symbol).await;
    Ok(Json(json!({ "symbol": symbol, "indicators": indicators })))
}

async fn get_expiries(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let symbol = parse_symbol(&symbol)?;
    let expiries = state.engine.expiries(symbol).await;
    Ok(Json(json!({ "symbol": symbol, "expiries": expiries })))
}

/// Latest polled snapshot; 404 until the first pass completes.
async fn get_snapshot(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let symbol = parse_symbol(&symbol)?;
    let snapshot = state
        .engine
        .snapshot(symbol)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!(snapshot)))
}

async fn generate_signal(
    State(state): State<AppState>,
    Json(request): Json<GenerateSignalRequest>,
) -> Json<Value> {
    let outcome = state.engine.generate_signal(request.symbol).await;
    Json(json!(outcome))
}

async fn list_signals(State(state): State<AppState>) -> Json<Value> {
    let signals = state.engine.signals().await;
    Json(json!(signals))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/market/{symbol}/quote", get(get_quote))
        .route("/api/market/{symbol}/candles", get(get_candles))
        .route("/api/market/{symbol}/option-chain", get(get_option_chain))
        .route("/api/market/{symbol}/indicators", get(get_indicators))
        .route("/api/market/{symbol}/expiries", get(get_expiries))
        .route("/api/market/{symbol}/snapshot", get(get_snapshot))
        .route("/api/signals", post(generate_signal))
        .route("/api/signals", get(list_signals))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Compose the engine from config and serve until the listener fails.
pub async fn start_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let start_time = Arc::new(Instant::now());

    let client = config
        .gemini_api_key
        .as_ref()
        .map(|key| {
            GenAiClient::with_client(
                config.gemini_base_url.clone(),
                key.clone(),
                config.gemini_model.clone(),
                reqwest::Client::new(),
            )
        });
    if client.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; AI features degrade to narrative replies");
    }

    let mut simulator = MarketSimulator::new().with_latency(config.simulated_latency());
    if let Some(client) = &client {
        simulator = simulator.with_oracle(Arc::new(crate::ai::GenAiQuoteOracle::new(client.clone())));
    }

    let engine = Arc::new(Engine::new(
        simulator,
        Advisor::new(client),
        metrics.clone(),
    ));

    let poller = MarketPoller::new(
        engine.clone(),
        config.symbols.clone(),
        config.poll_interval(),
    );
    poller.start().await;

    let state = AppState {
        engine,
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics,
        start_time,
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
