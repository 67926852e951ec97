//! In-process ledger.
//!
//! `MemoryLedger` keeps tasks, events, blocks and receipts in memory and
//! applies the escrow's transition rules on write. Receipt behaviour is
//! controlled with [`ConfirmMode`], and read failures can be injected, which
//! makes it suitable for exercising the worker's retry and timeout paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use alloy::primitives::{Address, TxHash, U256};
use async_trait::async_trait;

use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::types::{BlockSummary, Receipt, Task, TaskCreated, TaskStatus};

/// How writes are reflected in receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmMode {
  /// Writes land in the current block and the state change is applied.
  #[default]
  Immediate,
  /// Writes are accepted but never produce a receipt or a state change.
  Never,
  /// Writes land with a failed receipt and no state change.
  Revert,
}

/// A write issued against the ledger, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
  Accept { task_id: u64 },
  Submit { task_id: u64, proof_url: String },
}

#[derive(Default)]
struct State {
  height: u64,
  tasks: BTreeMap<u64, Task>,
  events: Vec<TaskCreated>,
  blocks: BTreeMap<u64, BlockSummary>,
  receipts: HashMap<TxHash, Receipt>,
  confirm_mode: ConfirmMode,
  failing_reads: u32,
  calls: Vec<LedgerCall>,
  next_tx: u64,
}

/// In-memory [`Ledger`].
pub struct MemoryLedger {
  account: Address,
  state: Mutex<State>,
}

impl MemoryLedger {
  /// Create an empty ledger whose signing identity is `account`.
  pub fn new(account: Address) -> Self {
    Self {
      account,
      state: Mutex::new(State::default()),
    }
  }

  fn state(&self) -> MutexGuard<'_, State> {
    // A poisoned lock only means another test thread panicked mid-update.
    self
      .state
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  pub fn set_height(&self, height: u64) {
    self.state().height = height;
  }

  pub fn set_confirm_mode(&self, mode: ConfirmMode) {
    self.state().confirm_mode = mode;
  }

  /// Make the next `count` height/event reads fail with an RPC error.
  pub fn fail_next_reads(&self, count: u32) {
    self.state().failing_reads = count;
  }

  pub fn insert_block(&self, summary: BlockSummary) {
    self.state().blocks.insert(summary.block_number, summary);
  }

  /// Record a task as created at `block`, emitting its `TaskCreated` event.
  pub fn create_task(&self, task: Task, block: u64) {
    let mut state = self.state();
    state.events.push(TaskCreated {
      task_id: task.id,
      employer: task.employer,
      payment: task.payment,
      token: task.token,
      description: task.description.clone(),
      block_number: Some(block),
    });
    state.tasks.insert(task.id, task);
    if block > state.height {
      state.height = block;
    }
  }

  /// Convenience constructor for an open, unassigned task.
  pub fn open_task(id: u64, description: &str) -> Task {
    Task {
      id,
      employer: Address::repeat_byte(0xee),
      worker: None,
      payment: U256::from(1_000_000_000_000_000u64),
      token: Address::ZERO,
      description: description.to_string(),
      proof_url: String::new(),
      status: TaskStatus::Open,
    }
  }

  /// Overwrite a task record, e.g. to simulate an external transition.
  pub fn put_task(&self, task: Task) {
    self.state().tasks.insert(task.id, task);
  }

  /// Writes issued so far.
  pub fn calls(&self) -> Vec<LedgerCall> {
    self.state().calls.clone()
  }

  /// Number of `acceptTask` calls issued for `task_id`.
  pub fn accept_calls(&self, task_id: u64) -> usize {
    self
      .state()
      .calls
      .iter()
      .filter(|c| matches!(c, LedgerCall::Accept { task_id: id } if *id == task_id))
      .count()
  }

  fn take_failure(state: &mut State) -> Result<(), LedgerError> {
    if state.failing_reads > 0 {
      state.failing_reads -= 1;
      return Err(LedgerError::Rpc {
        message: "injected read failure".to_string(),
      });
    }
    Ok(())
  }

  /// Record a write and, depending on the confirm mode, apply `apply`.
  ///
  /// `apply` returns whether the contract would allow the write; a refused
  /// write lands with a failed receipt.
  fn write(
    &self,
    call: LedgerCall,
    apply: impl FnOnce(&mut Task, Address) -> bool,
    task_id: u64,
  ) -> Result<TxHash, LedgerError> {
    let mut state = self.state();
    if !state.tasks.contains_key(&task_id) {
      return Err(LedgerError::TaskNotFound(task_id));
    }

    state.calls.push(call);
    state.next_tx += 1;
    let tx_hash = tx_hash_for(state.next_tx);
    let height = state.height;

    match state.confirm_mode {
      ConfirmMode::Immediate => {
        let success = state
          .tasks
          .get_mut(&task_id)
          .is_some_and(|task| apply(task, self.account));
        state.receipts.insert(
          tx_hash,
          Receipt {
            tx_hash,
            block_number: Some(height),
            success,
          },
        );
      }
      ConfirmMode::Revert => {
        state.receipts.insert(
          tx_hash,
          Receipt {
            tx_hash,
            block_number: Some(height),
            success: false,
          },
        );
      }
      ConfirmMode::Never => {}
    }

    Ok(tx_hash)
  }
}

fn tx_hash_for(n: u64) -> TxHash {
  let mut bytes = [0u8; 32];
  bytes[24..].copy_from_slice(&n.to_be_bytes());
  TxHash::from(bytes)
}

#[async_trait]
impl Ledger for MemoryLedger {
  fn account(&self) -> Address {
    self.account
  }

  async fn block_height(&self) -> Result<u64, LedgerError> {
    let mut state = self.state();
    Self::take_failure(&mut state)?;
    Ok(state.height)
  }

  async fn block_summary(&self, height: u64) -> Result<Option<BlockSummary>, LedgerError> {
    Ok(self.state().blocks.get(&height).cloned())
  }

  async fn task(&self, task_id: u64) -> Result<Task, LedgerError> {
    self
      .state()
      .tasks
      .get(&task_id)
      .cloned()
      .ok_or(LedgerError::TaskNotFound(task_id))
  }

  async fn tasks(&self) -> Result<Vec<Task>, LedgerError> {
    Ok(self.state().tasks.values().cloned().collect())
  }

  async fn task_created_events(
    &self,
    from: u64,
    to: u64,
  ) -> Result<Vec<TaskCreated>, LedgerError> {
    let mut state = self.state();
    Self::take_failure(&mut state)?;
    Ok(
      state
        .events
        .iter()
        .filter(|e| e.block_number.is_some_and(|b| b >= from && b <= to))
        .cloned()
        .collect(),
    )
  }

  async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, LedgerError> {
    Ok(self.state().receipts.get(&tx_hash).cloned())
  }

  async fn accept_task(&self, task_id: u64) -> Result<TxHash, LedgerError> {
    self.write(
      LedgerCall::Accept { task_id },
      |task, account| {
        if !task.status.can_advance_to(TaskStatus::Accepted) || !task.is_available_to(account) {
          return false;
        }
        task.status = TaskStatus::Accepted;
        task.worker = Some(account);
        true
      },
      task_id,
    )
  }

  async fn submit_work(&self, task_id: u64, proof_url: &str) -> Result<TxHash, LedgerError> {
    let proof = proof_url.to_string();
    self.write(
      LedgerCall::Submit {
        task_id,
        proof_url: proof_url.to_string(),
      },
      move |task, account| {
        if !task.status.can_advance_to(TaskStatus::Submitted) || task.worker != Some(account) {
          return false;
        }
        task.status = TaskStatus::Submitted;
        task.proof_url = proof;
        true
      },
      task_id,
    )
  }
}
