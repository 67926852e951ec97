//! Per-task lifecycle: accept, execute, publish, submit.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use zentra_artifact::{ProofArtifact, ProofPublisher};
use zentra_config::WorkerConfig;
use zentra_ledger::{Address, Ledger, Task, TaskStatus, TxHash};
use zentra_monitor::{EventMonitor, Watermark};
use zentra_task::Router;

use crate::confirm::{Confirmation, ConfirmationPoller};
use crate::error::EngineError;
use crate::events::{NoopNotifier, WorkerEvent, WorkerNotifier};

/// A write the driver sends to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
  Accept,
  Submit,
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Step::Accept => f.write_str("accept"),
      Step::Submit => f.write_str("submit"),
    }
  }
}

/// How handling a task ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskOutcome {
  /// Work was submitted and the submission confirmed.
  Submitted {
    task_id: u64,
    proof_url: String,
    tx_hash: TxHash,
  },
  /// Not actionable by this worker.
  Skipped { task_id: u64, reason: String },
  /// Actionable, but declined by the acceptance policy.
  Rejected { task_id: u64, reason: String },
  /// A write was sent but never confirmed. The task is parked until the
  /// ledger shows whether it landed.
  Unconfirmed {
    task_id: u64,
    step: Step,
    tx_hash: TxHash,
  },
  /// A write was mined and failed.
  Reverted {
    task_id: u64,
    step: Step,
    tx_hash: TxHash,
  },
  Failed { task_id: u64, reason: String },
}

impl TaskOutcome {
  pub fn task_id(&self) -> u64 {
    match self {
      TaskOutcome::Submitted { task_id, .. }
      | TaskOutcome::Skipped { task_id, .. }
      | TaskOutcome::Rejected { task_id, .. }
      | TaskOutcome::Unconfirmed { task_id, .. }
      | TaskOutcome::Reverted { task_id, .. }
      | TaskOutcome::Failed { task_id, .. } => *task_id,
    }
  }

  fn failed(task_id: u64, reason: impl fmt::Display) -> Self {
    TaskOutcome::Failed {
      task_id,
      reason: reason.to_string(),
    }
  }
}

/// A write awaiting reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parked {
  pub step: Step,
  pub tx_hash: TxHash,
}

/// Settings the driver reads from the worker configuration.
#[derive(Debug, Clone)]
pub struct DriverSettings {
  pub require_hosted: bool,
}

impl From<&WorkerConfig> for DriverSettings {
  fn from(config: &WorkerConfig) -> Self {
    Self {
      require_hosted: config.proof.require_hosted,
    }
  }
}

/// Drives tasks through `Open -> Accepted -> Submitted`.
///
/// Owns the scan watermark, the set of task ids already handled in this
/// process, and the tasks whose last write is unconfirmed. Task handling is
/// strictly sequential.
pub struct LifecycleDriver<N: WorkerNotifier = NoopNotifier> {
  ledger: Arc<dyn Ledger>,
  router: Router,
  proofs: ProofPublisher,
  poller: ConfirmationPoller,
  monitor: EventMonitor,
  settings: DriverSettings,
  watermark: Watermark,
  processed: HashSet<u64>,
  parked: BTreeMap<u64, Parked>,
  notifier: N,
}

impl LifecycleDriver<NoopNotifier> {
  pub fn new(
    ledger: Arc<dyn Ledger>,
    router: Router,
    proofs: ProofPublisher,
    config: &WorkerConfig,
  ) -> Self {
    Self::with_notifier(ledger, router, proofs, config, NoopNotifier)
  }
}

impl<N: WorkerNotifier> LifecycleDriver<N> {
  pub fn with_notifier(
    ledger: Arc<dyn Ledger>,
    router: Router,
    proofs: ProofPublisher,
    config: &WorkerConfig,
    notifier: N,
  ) -> Self {
    Self {
      ledger,
      router,
      proofs,
      poller: ConfirmationPoller::new(&config.confirmation),
      monitor: EventMonitor::new(&config.monitor),
      settings: DriverSettings::from(config),
      watermark: Watermark::new(),
      processed: HashSet::new(),
      parked: BTreeMap::new(),
      notifier,
    }
  }

  pub fn watermark(&self) -> Watermark {
    self.watermark
  }

  pub fn is_processed(&self, task_id: u64) -> bool {
    self.processed.contains(&task_id)
  }

  pub fn parked(&self) -> &BTreeMap<u64, Parked> {
    &self.parked
  }

  fn account(&self) -> Address {
    self.ledger.account()
  }

  /// One control-loop iteration: reconcile parked tasks, then scan the next
  /// window and handle every new task in event order.
  pub async fn tick(&mut self) -> Vec<TaskOutcome> {
    let mut outcomes = self.reconcile().await;

    let events = match self.monitor.poll(&*self.ledger, &mut self.watermark).await {
      Ok(events) => events,
      // Logged by the monitor; the window is retried next tick.
      Err(_) => return outcomes,
    };

    for event in events {
      if self.processed.contains(&event.task_id) {
        continue;
      }
      outcomes.push(self.handle_task(event.task_id).await);
    }

    outcomes
  }

  /// Handle every task this worker can act on, e.g. at startup: open tasks
  /// available to it, and tasks it accepted but never submitted.
  pub async fn sweep_open_tasks(&mut self) -> Result<Vec<TaskOutcome>, EngineError> {
    let account = self.account();
    let actionable: Vec<u64> = self
      .ledger
      .tasks()
      .await?
      .into_iter()
      .filter(|task| match task.status {
        TaskStatus::Open => task.is_available_to(account),
        TaskStatus::Accepted => task.worker == Some(account),
        _ => false,
      })
      .map(|task| task.id)
      .collect();

    info!(count = actionable.len(), "sweeping actionable tasks");

    let mut outcomes = Vec::new();
    for task_id in actionable {
      if !self.processed.contains(&task_id) {
        outcomes.push(self.handle_task(task_id).await);
      }
    }
    Ok(outcomes)
  }

  /// Handle one task id. A task is handled at most once per driver.
  #[instrument(skip(self))]
  pub async fn handle_task(&mut self, task_id: u64) -> TaskOutcome {
    if !self.processed.insert(task_id) {
      return TaskOutcome::Skipped {
        task_id,
        reason: "already processed".to_string(),
      };
    }

    let outcome = self.process(task_id).await;
    self.finish(outcome)
  }

  fn finish(&mut self, outcome: TaskOutcome) -> TaskOutcome {
    match &outcome {
      TaskOutcome::Submitted { task_id, proof_url, .. } => {
        info!(task_id, proof_url = %proof_url, "task submitted")
      }
      TaskOutcome::Skipped { task_id, reason } => info!(task_id, reason = %reason, "task skipped"),
      TaskOutcome::Rejected { task_id, reason } => info!(task_id, reason = %reason, "task rejected"),
      TaskOutcome::Unconfirmed { task_id, step, tx_hash } => {
        self.parked.insert(
          *task_id,
          Parked {
            step: *step,
            tx_hash: *tx_hash,
          },
        );
        warn!(task_id, step = %step, tx = %tx_hash, "write unconfirmed, parked for reconciliation")
      }
      TaskOutcome::Reverted { task_id, step, tx_hash } => {
        warn!(task_id, step = %step, tx = %tx_hash, "write reverted")
      }
      TaskOutcome::Failed { task_id, reason } => warn!(task_id, reason = %reason, "task failed"),
    }

    self.notifier.notify(WorkerEvent::Finished(outcome.clone()));
    outcome
  }

  async fn process(&mut self, task_id: u64) -> TaskOutcome {
    let task = match self.ledger.task(task_id).await {
      Ok(task) => task,
      Err(e) => return TaskOutcome::failed(task_id, e),
    };
    let account = self.account();

    match task.status {
      TaskStatus::Open if task.is_available_to(account) => {
        let evaluation = self.router.evaluate(&task.description);
        if !evaluation.accepted {
          return TaskOutcome::Rejected {
            task_id,
            reason: evaluation.reason.unwrap_or_default(),
          };
        }

        let tx_hash = match self.ledger.accept_task(task_id).await {
          Ok(tx_hash) => tx_hash,
          Err(e) => return TaskOutcome::failed(task_id, e),
        };
        self.notifier.notify(WorkerEvent::AcceptSent { task_id, tx_hash });
        info!(task_id, tx = %tx_hash, "accept sent");

        match self.poller.wait(&*self.ledger, tx_hash).await {
          Confirmation::Confirmed { .. } => self.fulfil(&task).await,
          Confirmation::Reverted { .. } => TaskOutcome::Reverted {
            task_id,
            step: Step::Accept,
            tx_hash,
          },
          Confirmation::TimedOut { .. } => TaskOutcome::Unconfirmed {
            task_id,
            step: Step::Accept,
            tx_hash,
          },
        }
      }
      TaskStatus::Accepted if task.worker == Some(account) => {
        info!(task_id, "resuming accepted task");
        self.fulfil(&task).await
      }
      TaskStatus::Open | TaskStatus::Accepted => TaskOutcome::Skipped {
        task_id,
        reason: "assigned to another worker".to_string(),
      },
      status => TaskOutcome::Skipped {
        task_id,
        reason: format!("task is {}", status),
      },
    }
  }

  /// Execute, publish and submit an accepted task.
  async fn fulfil(&mut self, task: &Task) -> TaskOutcome {
    let task_id = task.id;
    let execution = self.router.execute(task_id, &task.description).await;

    let artifact = ProofArtifact::new(task_id, execution.description, execution.result);
    let proof = self.proofs.publish(&artifact).await;
    self.notifier.notify(WorkerEvent::ProofPublished {
      task_id,
      url: proof.url.clone(),
      hosted: proof.hosted,
    });

    if !proof.hosted && self.settings.require_hosted {
      return TaskOutcome::failed(task_id, "proof hosting failed and a hosted proof is required");
    }

    let tx_hash = match self.ledger.submit_work(task_id, &proof.url).await {
      Ok(tx_hash) => tx_hash,
      Err(e) => return TaskOutcome::failed(task_id, e),
    };
    self.notifier.notify(WorkerEvent::SubmitSent { task_id, tx_hash });
    info!(task_id, tx = %tx_hash, "submit sent");

    match self.poller.wait(&*self.ledger, tx_hash).await {
      Confirmation::Confirmed { .. } => TaskOutcome::Submitted {
        task_id,
        proof_url: proof.url,
        tx_hash,
      },
      Confirmation::Reverted { .. } => TaskOutcome::Reverted {
        task_id,
        step: Step::Submit,
        tx_hash,
      },
      Confirmation::TimedOut { .. } => TaskOutcome::Unconfirmed {
        task_id,
        step: Step::Submit,
        tx_hash,
      },
    }
  }

  /// Re-read parked tasks and settle those whose write has landed or failed.
  /// A parked write is never re-sent.
  async fn reconcile(&mut self) -> Vec<TaskOutcome> {
    let account = self.account();
    let mut outcomes = Vec::new();
    let parked: Vec<(u64, Parked)> = self.parked.iter().map(|(id, p)| (*id, *p)).collect();

    for (task_id, parked) in parked {
      let task = match self.ledger.task(task_id).await {
        Ok(task) => task,
        Err(e) => {
          warn!(task_id, error = %e, "failed to re-read parked task");
          continue;
        }
      };

      let reverted = matches!(
        self.ledger.receipt(parked.tx_hash).await,
        Ok(Some(receipt)) if !receipt.success
      );

      let settled = match parked.step {
        Step::Accept if task.status == TaskStatus::Accepted && task.worker == Some(account) => {
          info!(task_id, "parked accept landed, resuming");
          self.parked.remove(&task_id);
          Some(self.fulfil(&task).await)
        }
        Step::Submit if task.status >= TaskStatus::Submitted && task.worker == Some(account) => {
          info!(task_id, status = %task.status, "parked submit landed");
          Some(TaskOutcome::Submitted {
            task_id,
            proof_url: task.proof_url.clone(),
            tx_hash: parked.tx_hash,
          })
        }
        step if reverted => Some(TaskOutcome::Reverted {
          task_id,
          step,
          tx_hash: parked.tx_hash,
        }),
        Step::Accept if task.status != TaskStatus::Open => Some(TaskOutcome::Skipped {
          task_id,
          reason: format!("task moved to {} while accept was pending", task.status),
        }),
        Step::Submit if task.status != TaskStatus::Accepted => Some(TaskOutcome::Skipped {
          task_id,
          reason: format!("task moved to {} while submit was pending", task.status),
        }),
        _ => None,
      };

      if let Some(outcome) = settled {
        self.parked.remove(&task_id);
        outcomes.push(self.finish(outcome));
      }
    }

    outcomes
  }
}
