use std::fmt;

use alloy::primitives::{Address, TxHash, U256};
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Lifecycle status of an escrow task.
///
/// `Completed`, `Disputed` and `Cancelled` are only ever set by the employer
/// or verifier; the worker drives `Open -> Accepted -> Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
  Open,
  Accepted,
  Submitted,
  Completed,
  Disputed,
  Cancelled,
}

impl TaskStatus {
  /// Whether moving from `self` to `next` follows the transition graph.
  pub fn can_advance_to(&self, next: TaskStatus) -> bool {
    use TaskStatus::*;
    matches!(
      (self, next),
      (Open, Accepted)
        | (Open, Cancelled)
        | (Accepted, Submitted)
        | (Submitted, Completed)
        | (Submitted, Disputed)
        | (Submitted, Cancelled)
    )
  }
}

impl TryFrom<u8> for TaskStatus {
  type Error = LedgerError;

  fn try_from(code: u8) -> Result<Self, Self::Error> {
    match code {
      0 => Ok(TaskStatus::Open),
      1 => Ok(TaskStatus::Accepted),
      2 => Ok(TaskStatus::Submitted),
      3 => Ok(TaskStatus::Completed),
      4 => Ok(TaskStatus::Disputed),
      5 => Ok(TaskStatus::Cancelled),
      other => Err(LedgerError::Decode {
        message: format!("unknown task status code {}", other),
      }),
    }
  }
}

impl From<TaskStatus> for u8 {
  fn from(status: TaskStatus) -> u8 {
    status as u8
  }
}

impl fmt::Display for TaskStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TaskStatus::Open => "OPEN",
      TaskStatus::Accepted => "ACCEPTED",
      TaskStatus::Submitted => "SUBMITTED",
      TaskStatus::Completed => "COMPLETED",
      TaskStatus::Disputed => "DISPUTED",
      TaskStatus::Cancelled => "CANCELLED",
    };
    f.write_str(name)
  }
}

/// A task record as stored by the escrow contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
  pub id: u64,
  pub employer: Address,
  /// `None` until a worker accepts the task.
  pub worker: Option<Address>,
  pub payment: U256,
  pub token: Address,
  pub description: String,
  /// Empty until work is submitted.
  pub proof_url: String,
  pub status: TaskStatus,
}

impl Task {
  /// Whether `account` may act on this task: unassigned, or assigned to it.
  pub fn is_available_to(&self, account: Address) -> bool {
    match self.worker {
      None => true,
      Some(worker) => worker == account,
    }
  }
}

/// A decoded `TaskCreated` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCreated {
  pub task_id: u64,
  pub employer: Address,
  pub payment: U256,
  pub token: Address,
  pub description: String,
  /// Block the event was emitted in, when the node reports it.
  pub block_number: Option<u64>,
}

/// The handful of block metrics used as grounding for analysis tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSummary {
  pub block_number: u64,
  pub tx_count: usize,
  pub gas_used: u64,
  pub timestamp: u64,
}

/// A transaction receipt, reduced to what confirmation needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
  pub tx_hash: TxHash,
  /// Block the transaction landed in. A receipt without one is not confirmed.
  pub block_number: Option<u64>,
  /// False when the transaction reverted.
  pub success: bool,
}

/// Convert a zero address (the contract's "unset") into `None`.
pub(crate) fn non_zero(address: Address) -> Option<Address> {
  if address == Address::ZERO {
    None
  } else {
    Some(address)
  }
}

/// Narrow an on-chain `uint256` task id to `u64`.
pub(crate) fn task_id_from(value: U256) -> Result<u64, LedgerError> {
  u64::try_from(value).map_err(|_| LedgerError::Decode {
    message: format!("task id {} does not fit in u64", value),
  })
}
