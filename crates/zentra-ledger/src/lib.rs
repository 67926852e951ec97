//! Zentra Ledger
//!
//! Read/write access to the task escrow contract. The [`Ledger`] trait is the
//! seam every other crate talks to; [`EscrowLedger`] implements it over EVM
//! JSON-RPC with a local signing key. With the `testing` feature, `MemoryLedger`
//! is an in-process implementation for exercising callers.
//!
//! Writes (`accept_task`, `submit_work`) return a transaction hash as soon as
//! the node accepts the transaction. Callers confirm them separately by
//! polling [`Ledger::receipt`].

mod error;
mod escrow;
mod ledger;
#[cfg(any(test, feature = "testing"))]
mod memory;
mod types;

pub use alloy::primitives::{Address, TxHash, U256};
pub use error::LedgerError;
pub use escrow::EscrowLedger;
pub use ledger::Ledger;
#[cfg(any(test, feature = "testing"))]
pub use memory::{ConfirmMode, LedgerCall, MemoryLedger};
pub use types::{BlockSummary, Receipt, Task, TaskCreated, TaskStatus};
