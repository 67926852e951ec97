//! The worker's control loop.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::driver::{LifecycleDriver, TaskOutcome};
use crate::events::WorkerNotifier;

/// Runs a [`LifecycleDriver`] on a fixed interval until cancelled.
///
/// # Usage
///
/// ```ignore
/// let runner = WorkerRunner::new(driver, config.polling_interval());
/// let cancel = CancellationToken::new();
/// runner.start(cancel).await;
/// ```
pub struct WorkerRunner<N: WorkerNotifier> {
  driver: LifecycleDriver<N>,
  interval: Duration,
  sweep_on_start: bool,
}

impl<N: WorkerNotifier> WorkerRunner<N> {
  pub fn new(driver: LifecycleDriver<N>, interval: Duration) -> Self {
    Self {
      driver,
      interval,
      sweep_on_start: false,
    }
  }

  /// Handle all currently open tasks before the first scan.
  pub fn with_startup_sweep(mut self, enabled: bool) -> Self {
    self.sweep_on_start = enabled;
    self
  }

  /// Run until `cancel` fires. An in-flight step is abandoned on cancellation;
  /// the ledger's task status is the source of truth on the next start.
  pub async fn start(mut self, cancel: CancellationToken) -> LifecycleDriver<N> {
    info!(interval_ms = self.interval.as_millis() as u64, "starting worker");

    if self.sweep_on_start {
      tokio::select! {
        biased;

        _ = cancel.cancelled() => {
          info!("worker cancelled during startup sweep");
          return self.driver;
        }
        swept = self.driver.sweep_open_tasks() => {
          match swept {
            Ok(outcomes) => outcomes.iter().for_each(log_outcome),
            Err(e) => error!(error = %e, "startup sweep failed"),
          }
        }
      }
    }

    let mut ticker = tokio::time::interval(self.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
      tokio::select! {
        biased;

        _ = cancel.cancelled() => {
          info!("worker cancelled");
          break;
        }
        _ = ticker.tick() => {
          tokio::select! {
            biased;

            _ = cancel.cancelled() => {
              info!("worker cancelled mid-tick");
              break;
            }
            outcomes = self.driver.tick() => {
              outcomes.iter().for_each(log_outcome);
            }
          }
        }
      }
    }

    self.driver
  }
}

fn log_outcome(outcome: &TaskOutcome) {
  info!(task_id = outcome.task_id(), outcome = ?outcome, "task handled");
}
