use thiserror::Error;

/// Errors that can occur while publishing or archiving a proof.
#[derive(Debug, Error)]
pub enum PublishError {
  #[error("failed to serialize artifact: {0}")]
  Serialize(#[from] serde_json::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("hosting service returned {status}: {body}")]
  Status { status: u16, body: String },

  /// The service answered with something other than an `https://` URL.
  #[error("unexpected hosting response: {body}")]
  UnexpectedResponse { body: String },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}
