use thiserror::Error;

/// Failures talking to the extraction service.
///
/// These never escape the crate as errors; they are folded into an
/// [`Outcome`](crate::Outcome) by the client.
#[derive(Debug, Error)]
pub enum ExtractError {
  #[error("extraction service not configured: {message}")]
  NotConfigured { message: String },

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("service returned HTTP {status}: {body}")]
  Status { status: u16, body: String },

  #[error("response had no text content")]
  EmptyResponse,

  #[error("reply was not valid JSON: {message}")]
  Parse { message: String },
}
