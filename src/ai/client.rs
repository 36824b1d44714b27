//! REST client for the generative text endpoint.

use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// Default production endpoint; tests point `base_url` at a mock server.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Per-request generation parameters.
#[derive(Debug, Clone, Default)]
pub struct GenerationConfig {
    pub temperature: f64,
    pub response_mime_type: Option<&'static str>,
    pub response_schema: Option<Value>,
}

impl GenerationConfig {
    /// Factual extraction: no sampling freedom, plain text reply.
    pub fn factual() -> Self {
        Self {
            temperature: 0.0,
            ..Self::default()
        }
    }

    /// Structured analysis constrained to a JSON schema.
    pub fn structured(schema: Value) -> Self {
        Self {
            temperature: 0.3,
            response_mime_type: Some("application/json"),
            response_schema: Some(schema),
        }
    }
}

/// Transport-level failure of a single generate call.
#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("generative endpoint returned HTTP 429")]
    RateLimited,
    #[error("generative endpoint returned HTTP {0}")]
    Status(u16),
    #[error("request to generative endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generative reply carried no text")]
    EmptyReply,
}

#[derive(Debug, Clone)]
pub struct GenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GenAiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_client(DEFAULT_BASE_URL, api_key, model, reqwest::Client::new())
    }

    /// Build against an explicit base URL and reqwest client, so tests
    /// can stand a mock server in for the real endpoint.
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        http: reqwest::Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Send one prompt and return the reply text.
    pub async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, GenAiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let mut generation_config = json!({ "temperature": config.temperature });
        if let Some(mime) = config.response_mime_type {
            generation_config["responseMimeType"] = json!(mime);
        }
        if let Some(schema) = &config.response_schema {
            generation_config["responseSchema"] = schema.clone();
        }

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": generation_config,
        });

        debug!(model = %self.model, prompt_chars = prompt.len(), "sending generate request");
        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(GenAiError::RateLimited);
        }
        if !status.is_success() {
            return Err(GenAiError::Status(status.as_u16()));
        }

        let payload: GenerateContentResponse = response.json().await?;
        payload.text().ok_or(GenAiError::EmptyReply)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(&self) -> Option<String> {
        let text: String = self
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}
