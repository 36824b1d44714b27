//! AI advisory client.
//!
//! Translates market snapshots into natural-language requests to an
//! external generative endpoint and translates the structured replies
//! back into trade advisories. Also implements the live-quote oracle the
//! simulator consults before falling back to simulation.

pub mod advisor;
pub mod client;
pub mod error;
pub mod oracle;

pub use advisor::Advisor;
pub use client::{GenAiClient, GenerationConfig};
pub use error::AdvisoryError;
pub use oracle::GenAiQuoteOracle;
