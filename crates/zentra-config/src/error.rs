use thiserror::Error;

/// Errors raised while loading or validating worker configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("missing required setting: {field}")]
  Missing { field: String },

  #[error("invalid setting '{field}': {message}")]
  Invalid { field: String, message: String },
}
