//! Anthropic Messages API client.

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use zentra_config::ExtractionConfig;

use crate::error::ExtractError;
use crate::outcome::Outcome;
use crate::{ExtractionRequest, Extractor};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
  model: &'a str,
  max_tokens: u32,
  messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
  role: &'a str,
  content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
  #[serde(default)]
  content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
  #[serde(default)]
  text: Option<String>,
}

/// Extraction client for the Anthropic Messages API.
pub struct AnthropicExtractor {
  client: reqwest::Client,
  config: ExtractionConfig,
}

impl AnthropicExtractor {
  pub fn new(config: ExtractionConfig) -> Result<Self, ExtractError> {
    let client = reqwest::Client::builder()
      .timeout(config.timeout())
      .build()?;
    Ok(Self { client, config })
  }

  /// Whether a credential is available. Without one every request degrades.
  pub fn is_configured(&self) -> bool {
    self.config.api_key.is_some()
  }

  async fn request(&self, request: &ExtractionRequest) -> Result<serde_json::Value, ExtractError> {
    let api_key = self
      .config
      .api_key
      .as_deref()
      .ok_or_else(|| ExtractError::NotConfigured {
        message: "no API key".to_string(),
      })?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
    headers.insert(
      "x-api-key",
      HeaderValue::from_str(api_key).map_err(|e| ExtractError::NotConfigured {
        message: format!("API key is not a valid header value: {}", e),
      })?,
    );

    let body = MessagesRequest {
      model: &self.config.model,
      max_tokens: request.max_tokens,
      messages: vec![Message {
        role: "user",
        content: &request.prompt,
      }],
    };

    let url = format!("{}/v1/messages", self.config.endpoint.trim_end_matches('/'));
    debug!(url = %url, prompt_chars = request.prompt.len(), "sending extraction request");

    let response = self
      .client
      .post(&url)
      .headers(headers)
      .json(&body)
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(ExtractError::Status {
        status: status.as_u16(),
        body,
      });
    }

    let parsed: MessagesResponse = response.json().await?;
    let text = parsed
      .content
      .into_iter()
      .find_map(|block| block.text)
      .ok_or(ExtractError::EmptyResponse)?;

    parse_json_reply(&text)
  }
}

#[async_trait]
impl Extractor for AnthropicExtractor {
  async fn extract(&self, request: ExtractionRequest) -> Outcome<serde_json::Value> {
    match self.request(&request).await {
      Ok(value) => {
        info!("extraction succeeded");
        Outcome::Ok(value)
      }
      Err(e @ ExtractError::NotConfigured { .. }) => {
        info!(reason = %e, "extraction skipped");
        Outcome::Degraded(e.to_string())
      }
      Err(e @ (ExtractError::EmptyResponse | ExtractError::Parse { .. })) => {
        warn!(error = %e, "extraction reply unusable");
        Outcome::Degraded(e.to_string())
      }
      Err(e) => {
        warn!(error = %e, "extraction request failed");
        Outcome::Failed(e.to_string())
      }
    }
  }
}

/// Parse a model reply as a JSON object, tolerating markdown code fences.
pub fn parse_json_reply(text: &str) -> Result<serde_json::Value, ExtractError> {
  let cleaned = text.replace("```json", "").replace("```", "");
  let value: serde_json::Value =
    serde_json::from_str(cleaned.trim()).map_err(|e| ExtractError::Parse {
      message: e.to_string(),
    })?;

  if !value.is_object() {
    return Err(ExtractError::Parse {
      message: "expected a JSON object".to_string(),
    });
  }

  Ok(value)
}
