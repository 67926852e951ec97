//! Worker events and notifiers for observability.
//!
//! The driver emits an event at each lifecycle step so consumers can log,
//! persist or stream progress without the driver knowing about them.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use zentra_ledger::TxHash;

use crate::driver::TaskOutcome;

/// Events emitted while driving tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkerEvent {
  /// An accept transaction was sent.
  AcceptSent { task_id: u64, tx_hash: TxHash },

  /// The proof was published (or replaced by a placeholder).
  ProofPublished {
    task_id: u64,
    url: String,
    hosted: bool,
  },

  /// A submit transaction was sent.
  SubmitSent { task_id: u64, tx_hash: TxHash },

  /// Handling of a task finished.
  Finished(TaskOutcome),
}

/// Receives worker events.
pub trait WorkerNotifier: Send + Sync {
  fn notify(&self, event: WorkerEvent);
}

/// Discards all events.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl WorkerNotifier for NoopNotifier {
  fn notify(&self, _event: WorkerEvent) {}
}

/// Forwards events to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<WorkerEvent>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<WorkerEvent>) -> Self {
    Self { sender }
  }
}

impl WorkerNotifier for ChannelNotifier {
  fn notify(&self, event: WorkerEvent) {
    // Receiver may have been dropped.
    let _ = self.sender.send(event);
  }
}
