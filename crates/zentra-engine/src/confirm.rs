//! Transaction confirmation polling.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zentra_config::ConfirmationConfig;
use zentra_ledger::{Ledger, TxHash};

/// What became of a submitted transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Confirmation {
  Confirmed { block_number: u64 },
  /// Mined, but execution failed.
  Reverted { block_number: u64 },
  /// No receipt within the retry budget. The transaction may still land.
  TimedOut { attempts: u32 },
}

/// Polls for a receipt at a fixed interval after an initial delay.
#[derive(Debug, Clone)]
pub struct ConfirmationPoller {
  initial_delay: Duration,
  interval: Duration,
  max_attempts: u32,
}

impl ConfirmationPoller {
  pub fn new(config: &ConfirmationConfig) -> Self {
    Self {
      initial_delay: config.initial_delay(),
      interval: config.interval(),
      max_attempts: config.max_attempts,
    }
  }

  pub async fn wait<L: Ledger + ?Sized>(&self, ledger: &L, tx_hash: TxHash) -> Confirmation {
    tokio::time::sleep(self.initial_delay).await;

    for attempt in 1..=self.max_attempts {
      match ledger.receipt(tx_hash).await {
        Ok(Some(receipt)) => {
          if let Some(block_number) = receipt.block_number {
            debug!(tx = %tx_hash, block_number, attempt, success = receipt.success, "receipt found");
            return if receipt.success {
              Confirmation::Confirmed { block_number }
            } else {
              Confirmation::Reverted { block_number }
            };
          }
        }
        Ok(None) => {}
        Err(e) => warn!(tx = %tx_hash, attempt, error = %e, "receipt read failed"),
      }

      if attempt < self.max_attempts {
        tokio::time::sleep(self.interval).await;
      }
    }

    warn!(tx = %tx_hash, attempts = self.max_attempts, "transaction not confirmed");
    Confirmation::TimedOut {
      attempts: self.max_attempts,
    }
  }
}
