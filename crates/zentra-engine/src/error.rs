use thiserror::Error;
use zentra_ledger::LedgerError;

/// Errors that stop a driver operation as a whole (not a single task).
#[derive(Debug, Error)]
pub enum EngineError {
  #[error("ledger error: {0}")]
  Ledger(#[from] LedgerError),
}
