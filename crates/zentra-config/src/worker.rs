use std::fmt;
use std::path::Path;
use std::time::Duration;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::enums::{AcceptancePolicy, TaskCategory};
use crate::error::ConfigError;
use crate::sections::{
  AcceptanceConfig, ConfirmationConfig, ExtractionConfig, FetchConfig, MonitorConfig, ProofConfig,
};

/// Environment variable consulted when the config file has no signing key.
pub const PRIVATE_KEY_ENV: &str = "ZENTRA_PRIVATE_KEY";

/// Environment variable consulted when the config file has no extraction key.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Top-level worker configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
  /// JSON-RPC endpoint of the ledger.
  pub rpc_url: String,

  /// Chain id used when signing. Queried from the node when absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub chain_id: Option<u64>,

  /// Address of the task escrow contract.
  pub contract_address: Address,

  /// Hex-encoded signing key for the worker identity.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub wallet_private_key: Option<String>,

  #[serde(default = "default_polling_interval_ms")]
  pub polling_interval_ms: u64,

  /// Categories this worker is willing to execute.
  #[serde(default = "default_capabilities")]
  pub capabilities: Vec<TaskCategory>,

  /// Sweep every open task once at startup, in addition to new events.
  #[serde(default)]
  pub scan_open_tasks_on_start: bool,

  #[serde(default)]
  pub monitor: MonitorConfig,

  #[serde(default)]
  pub confirmation: ConfirmationConfig,

  #[serde(default)]
  pub fetch: FetchConfig,

  #[serde(default)]
  pub extraction: ExtractionConfig,

  #[serde(default)]
  pub proof: ProofConfig,

  #[serde(default)]
  pub acceptance: AcceptanceConfig,
}

fn default_polling_interval_ms() -> u64 {
  10_000
}

fn default_capabilities() -> Vec<TaskCategory> {
  TaskCategory::ALL.to_vec()
}

impl WorkerConfig {
  /// Parse a config from a JSON string. Does not validate.
  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(content)?)
  }

  /// Read and parse a config file, then fill secrets from the environment.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
      path: path.display().to_string(),
      source: e,
    })?;

    let mut config = Self::from_json(&content)?;
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
  }

  /// Fill unset secrets using `lookup` (normally the process environment).
  pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
    if self.wallet_private_key.is_none() {
      self.wallet_private_key = lookup(PRIVATE_KEY_ENV).filter(|v| !v.trim().is_empty());
    }
    if self.extraction.api_key.is_none() {
      self.extraction.api_key = lookup(ANTHROPIC_API_KEY_ENV).filter(|v| !v.trim().is_empty());
    }
  }

  /// Check the settings the worker cannot run without.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.rpc_url.trim().is_empty() {
      return Err(ConfigError::Missing {
        field: "rpc_url".to_string(),
      });
    }

    if self.contract_address == Address::ZERO {
      return Err(ConfigError::Invalid {
        field: "contract_address".to_string(),
        message: "must not be the zero address".to_string(),
      });
    }

    match &self.wallet_private_key {
      None => {
        return Err(ConfigError::Missing {
          field: format!("wallet_private_key (or {})", PRIVATE_KEY_ENV),
        });
      }
      Some(key) => {
        let hex = key.trim().trim_start_matches("0x");
        if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
          return Err(ConfigError::Invalid {
            field: "wallet_private_key".to_string(),
            message: "expected 32 bytes of hex".to_string(),
          });
        }
      }
    }

    if self.polling_interval_ms == 0 {
      return Err(ConfigError::Invalid {
        field: "polling_interval_ms".to_string(),
        message: "must be greater than zero".to_string(),
      });
    }

    if self.capabilities.is_empty() {
      return Err(ConfigError::Invalid {
        field: "capabilities".to_string(),
        message: "at least one category is required".to_string(),
      });
    }

    if self.monitor.window == 0 {
      return Err(ConfigError::Invalid {
        field: "monitor.window".to_string(),
        message: "must be greater than zero".to_string(),
      });
    }

    if self.confirmation.max_attempts == 0 {
      return Err(ConfigError::Invalid {
        field: "confirmation.max_attempts".to_string(),
        message: "must be greater than zero".to_string(),
      });
    }

    if self.acceptance.policy == AcceptancePolicy::MinConfidence
      && !(0.0..=1.0).contains(&self.acceptance.min_confidence)
    {
      return Err(ConfigError::Invalid {
        field: "acceptance.min_confidence".to_string(),
        message: "must be within 0.0..=1.0".to_string(),
      });
    }

    Ok(())
  }

  pub fn polling_interval(&self) -> Duration {
    Duration::from_millis(self.polling_interval_ms)
  }
}

// Hand-written so the signing key and API key never reach the logs.
impl fmt::Debug for WorkerConfig {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WorkerConfig")
      .field("rpc_url", &self.rpc_url)
      .field("chain_id", &self.chain_id)
      .field("contract_address", &self.contract_address)
      .field(
        "wallet_private_key",
        &self.wallet_private_key.as_ref().map(|_| "<redacted>"),
      )
      .field("polling_interval_ms", &self.polling_interval_ms)
      .field("capabilities", &self.capabilities)
      .field("scan_open_tasks_on_start", &self.scan_open_tasks_on_start)
      .field("monitor", &self.monitor)
      .field("confirmation", &self.confirmation)
      .field("fetch", &self.fetch)
      .field(
        "extraction_configured",
        &self.extraction.api_key.is_some(),
      )
      .field("proof", &self.proof)
      .field("acceptance", &self.acceptance)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

  fn minimal_json() -> String {
    format!(
      r#"{{
        "rpc_url": "https://testnet-rpc.monad.xyz",
        "contract_address": "0xA0A261A70C0904142804CF20C752f67BA57236d1",
        "wallet_private_key": "{}"
      }}"#,
      KEY
    )
  }

  #[test]
  fn test_minimal_config_uses_defaults() {
    let config = WorkerConfig::from_json(&minimal_json()).unwrap();

    assert_eq!(config.polling_interval_ms, 10_000);
    assert_eq!(config.capabilities.len(), 4);
    assert_eq!(config.monitor.window, 75);
    assert_eq!(config.fetch.max_redirects, 5);
    assert_eq!(config.proof.endpoint, "https://paste.rs/");
    assert_eq!(config.acceptance.policy, AcceptancePolicy::AcceptAll);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_missing_key_is_fatal() {
    let json = r#"{
      "rpc_url": "https://testnet-rpc.monad.xyz",
      "contract_address": "0xA0A261A70C0904142804CF20C752f67BA57236d1"
    }"#;
    let config = WorkerConfig::from_json(json).unwrap();

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::Missing { .. }));
  }

  #[test]
  fn test_malformed_contract_address_fails_to_parse() {
    let json = r#"{
      "rpc_url": "https://testnet-rpc.monad.xyz",
      "contract_address": "not-an-address"
    }"#;

    assert!(matches!(
      WorkerConfig::from_json(json),
      Err(ConfigError::Parse(_))
    ));
  }

  #[test]
  fn test_zero_contract_address_rejected() {
    let mut config = WorkerConfig::from_json(&minimal_json()).unwrap();
    config.contract_address = Address::ZERO;

    assert!(matches!(
      config.validate(),
      Err(ConfigError::Invalid { field, .. }) if field == "contract_address"
    ));
  }

  #[test]
  fn test_short_key_rejected() {
    let mut config = WorkerConfig::from_json(&minimal_json()).unwrap();
    config.wallet_private_key = Some("0x1234".to_string());

    assert!(config.validate().is_err());
  }

  #[test]
  fn test_env_fills_missing_secrets_only() {
    let json = r#"{
      "rpc_url": "https://testnet-rpc.monad.xyz",
      "contract_address": "0xA0A261A70C0904142804CF20C752f67BA57236d1",
      "extraction": { "api_key": "from-file" }
    }"#;
    let mut config = WorkerConfig::from_json(json).unwrap();

    config.apply_env(|key| match key {
      PRIVATE_KEY_ENV => Some(KEY.to_string()),
      ANTHROPIC_API_KEY_ENV => Some("from-env".to_string()),
      _ => None,
    });

    assert_eq!(config.wallet_private_key.as_deref(), Some(KEY));
    assert_eq!(config.extraction.api_key.as_deref(), Some("from-file"));
  }

  #[test]
  fn test_debug_redacts_secrets() {
    let config = WorkerConfig::from_json(&minimal_json()).unwrap();
    let rendered = format!("{:?}", config);

    assert!(!rendered.contains(KEY.trim_start_matches("0x")));
    assert!(rendered.contains("<redacted>"));
  }

  #[test]
  fn test_unknown_capability_rejected() {
    let json = r#"{
      "rpc_url": "https://testnet-rpc.monad.xyz",
      "contract_address": "0xA0A261A70C0904142804CF20C752f67BA57236d1",
      "capabilities": ["web_scraping", "painting"]
    }"#;

    assert!(WorkerConfig::from_json(json).is_err());
  }
}
