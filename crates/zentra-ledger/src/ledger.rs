use std::sync::Arc;

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;

use crate::error::LedgerError;
use crate::types::{BlockSummary, Receipt, Task, TaskCreated};

/// Access to the escrow ledger.
///
/// Reads are side-effect free. Writes return once the transaction is accepted
/// by the node; they are not confirmed until a receipt with a block number is
/// observed through [`Ledger::receipt`].
#[async_trait]
pub trait Ledger: Send + Sync {
  /// Address of the signing identity used for writes.
  fn account(&self) -> Address;

  /// Current block height.
  async fn block_height(&self) -> Result<u64, LedgerError>;

  /// Metrics for one block, or `None` if the node does not have it.
  async fn block_summary(&self, height: u64) -> Result<Option<BlockSummary>, LedgerError>;

  /// Read a single task record.
  async fn task(&self, task_id: u64) -> Result<Task, LedgerError>;

  /// Read every task record.
  async fn tasks(&self) -> Result<Vec<Task>, LedgerError>;

  /// `TaskCreated` events emitted in the inclusive block range.
  async fn task_created_events(&self, from: u64, to: u64)
  -> Result<Vec<TaskCreated>, LedgerError>;

  /// Receipt for a transaction, or `None` if it has not landed yet.
  async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, LedgerError>;

  /// Submit an `acceptTask` transaction.
  async fn accept_task(&self, task_id: u64) -> Result<TxHash, LedgerError>;

  /// Submit a `submitWork` transaction carrying the proof reference.
  async fn submit_work(&self, task_id: u64, proof_url: &str) -> Result<TxHash, LedgerError>;
}

#[async_trait]
impl<L: Ledger + ?Sized> Ledger for Arc<L> {
  fn account(&self) -> Address {
    (**self).account()
  }

  async fn block_height(&self) -> Result<u64, LedgerError> {
    (**self).block_height().await
  }

  async fn block_summary(&self, height: u64) -> Result<Option<BlockSummary>, LedgerError> {
    (**self).block_summary(height).await
  }

  async fn task(&self, task_id: u64) -> Result<Task, LedgerError> {
    (**self).task(task_id).await
  }

  async fn tasks(&self) -> Result<Vec<Task>, LedgerError> {
    (**self).tasks().await
  }

  async fn task_created_events(
    &self,
    from: u64,
    to: u64,
  ) -> Result<Vec<TaskCreated>, LedgerError> {
    (**self).task_created_events(from, to).await
  }

  async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, LedgerError> {
    (**self).receipt(tx_hash).await
  }

  async fn accept_task(&self, task_id: u64) -> Result<TxHash, LedgerError> {
    (**self).accept_task(task_id).await
  }

  async fn submit_work(&self, task_id: u64, proof_url: &str) -> Result<TxHash, LedgerError> {
    (**self).submit_work(task_id, proof_url).await
  }
}
