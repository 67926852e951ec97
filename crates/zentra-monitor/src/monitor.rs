use tracing::{debug, info, instrument, warn};
use zentra_config::MonitorConfig;
use zentra_ledger::{Ledger, LedgerError, TaskCreated};

use crate::watermark::Watermark;

/// Polls a ledger for new task events, one window per call.
#[derive(Debug, Clone)]
pub struct EventMonitor {
  window: u64,
  lookback: u64,
}

impl EventMonitor {
  pub fn new(config: &MonitorConfig) -> Self {
    Self {
      window: config.window.max(1),
      lookback: config.lookback,
    }
  }

  /// Scan the next window above `watermark`.
  ///
  /// An unset watermark starts `lookback` blocks below the current height.
  /// On success the watermark moves to the top of the scanned range, whether
  /// or not it held events. On error the window is not marked scanned.
  #[instrument(skip(self, ledger, watermark), fields(watermark = ?watermark.height()))]
  pub async fn poll<L: Ledger + ?Sized>(
    &self,
    ledger: &L,
    watermark: &mut Watermark,
  ) -> Result<Vec<TaskCreated>, LedgerError> {
    let height = match ledger.block_height().await {
      Ok(height) => height,
      Err(e) => {
        warn!(error = %e, "failed to read block height");
        return Err(e);
      }
    };

    let scanned = match watermark.height() {
      Some(scanned) => scanned,
      None => {
        let start = height.saturating_sub(self.lookback);
        info!(height, start, "starting scan below current height");
        *watermark = Watermark::at(start);
        start
      }
    };

    if scanned >= height {
      debug!(height, "no new blocks");
      return Ok(Vec::new());
    }

    let from = scanned + 1;
    let to = scanned.saturating_add(self.window).min(height);

    let events = match ledger.task_created_events(from, to).await {
      Ok(events) => events,
      Err(e) => {
        warn!(from, to, error = %e, "failed to read task events, will retry");
        return Err(e);
      }
    };

    if let Err(e) = watermark.advance(to) {
      warn!(error = %e, "watermark not advanced");
    }

    if !events.is_empty() {
      info!(from, to, count = events.len(), "found new tasks");
    } else {
      debug!(from, to, "scanned window");
    }

    Ok(events)
  }
}
