//! Zentra Extract
//!
//! Client for the generative extraction service. A request is a prompt plus
//! an output-size budget; the reply is expected to be a single JSON object.
//!
//! Nothing here returns an error to the caller. Every call yields an
//! [`Outcome`], so strategies can treat "service down", "no credential" and
//! "garbage reply" as data and fall back deterministically.

mod anthropic;
mod error;
mod outcome;

pub use anthropic::{AnthropicExtractor, parse_json_reply};
pub use error::ExtractError;
pub use outcome::Outcome;

use async_trait::async_trait;

/// A structured-extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
  pub prompt: String,
  /// Output-size budget passed to the service.
  pub max_tokens: u32,
}

/// A service that turns a prompt into a JSON object.
#[async_trait]
pub trait Extractor: Send + Sync {
  async fn extract(&self, request: ExtractionRequest) -> Outcome<serde_json::Value>;
}
