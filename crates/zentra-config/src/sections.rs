//! Per-component configuration sections.
//!
//! Durations are stored as milliseconds, matching how timeouts are expressed
//! everywhere else in the config.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::enums::AcceptancePolicy;

/// Event monitor scan window settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
  /// Maximum number of blocks scanned per tick.
  pub window: u64,
  /// How far below the current height to start on a cold start.
  pub lookback: u64,
}

impl Default for MonitorConfig {
  fn default() -> Self {
    Self {
      window: 75,
      lookback: 75,
    }
  }
}

/// Transaction confirmation polling budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationConfig {
  pub initial_delay_ms: u64,
  pub interval_ms: u64,
  pub max_attempts: u32,
}

impl ConfirmationConfig {
  pub fn initial_delay(&self) -> Duration {
    Duration::from_millis(self.initial_delay_ms)
  }

  pub fn interval(&self) -> Duration {
    Duration::from_millis(self.interval_ms)
  }
}

impl Default for ConfirmationConfig {
  fn default() -> Self {
    Self {
      initial_delay_ms: 10_000,
      interval_ms: 3_000,
      max_attempts: 20,
    }
  }
}

/// Content fetcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
  /// Overall deadline for one fetch, redirects included.
  pub timeout_ms: u64,
  /// Maximum number of redirect hops followed before giving up.
  pub max_redirects: u32,
  pub user_agent: String,
}

impl FetchConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }
}

impl Default for FetchConfig {
  fn default() -> Self {
    Self {
      timeout_ms: 15_000,
      max_redirects: 5,
      user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0.0.0 Safari/537.36"
        .to_string(),
    }
  }
}

/// Generative extraction service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
  pub endpoint: String,
  pub model: String,
  /// API key. Falls back to the `ANTHROPIC_API_KEY` environment variable.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub api_key: Option<String>,
  pub timeout_ms: u64,
  /// Output-size budget for each extraction request.
  pub max_tokens: u32,
}

impl ExtractionConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }
}

impl Default for ExtractionConfig {
  fn default() -> Self {
    Self {
      endpoint: "https://api.anthropic.com".to_string(),
      model: "claude-haiku-4-5-20251001".to_string(),
      api_key: None,
      timeout_ms: 60_000,
      max_tokens: 4_000,
    }
  }
}

/// Proof hosting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofConfig {
  /// Plain-text hosting endpoint the artifact is POSTed to.
  pub endpoint: String,
  /// Base URL for placeholder proofs when hosting fails.
  pub placeholder_base: String,
  /// Refuse to submit work carrying a placeholder proof.
  pub require_hosted: bool,
  pub timeout_ms: u64,
  /// Directory receiving a local copy of every artifact.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub archive_dir: Option<PathBuf>,
}

impl ProofConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }
}

impl Default for ProofConfig {
  fn default() -> Self {
    Self {
      endpoint: "https://paste.rs/".to_string(),
      placeholder_base: "https://zentra.vercel.app".to_string(),
      require_hosted: false,
      timeout_ms: 15_000,
      archive_dir: None,
    }
  }
}

/// Task acceptance policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcceptanceConfig {
  pub policy: AcceptancePolicy,
  /// Only consulted when `policy` is `min_confidence`.
  pub min_confidence: f64,
}

impl Default for AcceptanceConfig {
  fn default() -> Self {
    Self {
      policy: AcceptancePolicy::AcceptAll,
      min_confidence: 0.8,
    }
  }
}
