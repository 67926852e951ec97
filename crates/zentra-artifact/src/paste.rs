use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::Publisher;
use crate::error::PublishError;

/// Publishes artifacts to a paste service that answers a plain-text POST
/// with the paste URL.
pub struct PasteRsPublisher {
  client: reqwest::Client,
  endpoint: String,
}

impl PasteRsPublisher {
  pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PublishError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      endpoint: endpoint.into(),
    })
  }
}

#[async_trait]
impl Publisher for PasteRsPublisher {
  async fn publish(&self, body: &str) -> Result<String, PublishError> {
    debug!(endpoint = %self.endpoint, bytes = body.len(), "uploading proof");

    let response = self
      .client
      .post(&self.endpoint)
      .header(CONTENT_TYPE, "text/plain")
      .body(body.to_string())
      .send()
      .await?;

    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
      return Err(PublishError::Status {
        status: status.as_u16(),
        body: text,
      });
    }

    let url = text.trim();
    if !url.starts_with("https://") {
      return Err(PublishError::UnexpectedResponse {
        body: url.to_string(),
      });
    }

    Ok(url.to_string())
  }
}
