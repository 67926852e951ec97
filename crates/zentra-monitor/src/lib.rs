//! Zentra Monitor
//!
//! Scans the ledger for `TaskCreated` events in bounded block windows. The
//! [`Watermark`] records the highest block already scanned; it only moves
//! forward, and only after a window was read successfully, so a failed read
//! is retried on the next poll.

mod monitor;
mod watermark;

pub use monitor::EventMonitor;
pub use watermark::{Watermark, WatermarkError};
