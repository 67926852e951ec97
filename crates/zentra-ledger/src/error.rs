use thiserror::Error;

/// Errors returned by ledger reads and writes.
#[derive(Debug, Error)]
pub enum LedgerError {
  /// Transport or JSON-RPC failure talking to the node.
  #[error("rpc error: {message}")]
  Rpc { message: String },

  /// Contract call reverted or could not be encoded/decoded.
  #[error("contract error: {message}")]
  Contract { message: String },

  /// The node returned data that does not fit the task model.
  #[error("invalid ledger data: {message}")]
  Decode { message: String },

  #[error("task not found: {0}")]
  TaskNotFound(u64),

  /// Client setup failed (bad key, bad endpoint, chain mismatch).
  #[error("ledger configuration error: {message}")]
  Config { message: String },
}
