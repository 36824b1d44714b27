//! Failure taxonomy for the advisory path.

use thiserror::Error;

/// Why a signal-mode advisory call failed. Each variant maps onto a
/// fixed narrative reply so the caller always has something uniform to
/// render; none of these ever escape as a raw fault.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    #[error("advisory service is not configured")]
    NotConfigured,
    #[error("advisory service is rate limited")]
    RateLimited,
    #[error("advisory reply was empty")]
    EmptyReply,
    #[error("the AI reply was not valid JSON")]
    InvalidJson(#[source] serde_json::Error),
    #[error("AI response is missing required fields: {0}")]
    MissingFields(String),
    #[error("{0}")]
    Transport(String),
}
