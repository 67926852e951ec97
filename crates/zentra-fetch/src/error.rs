use thiserror::Error;

/// Errors that can occur while fetching a document.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("invalid url '{url}': {message}")]
  InvalidUrl { url: String, message: String },

  #[error("unsupported url scheme '{scheme}'")]
  UnsupportedScheme { scheme: String },

  /// Network or protocol failure.
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The overall deadline elapsed, redirects included.
  #[error("request timed out after {timeout_ms}ms")]
  Timeout { timeout_ms: u64 },

  #[error("too many redirects fetching {url} (limit {max_redirects})")]
  TooManyRedirects { url: String, max_redirects: u32 },
}
