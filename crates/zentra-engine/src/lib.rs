//! Zentra Engine
//!
//! Drives escrow tasks through their lifecycle.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       WorkerRunner                          │
//! │  - fixed-interval ticks, stops on CancellationToken         │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     LifecycleDriver                         │
//! │  - EventMonitor window scan, processed set, parked writes   │
//! │  - accept → execute → publish → submit                      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   ConfirmationPoller                        │
//! │  - receipt polling: Confirmed / Reverted / TimedOut         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every task ends in a [`TaskOutcome`] value; nothing a single task does
//! stops the loop.

mod confirm;
mod driver;
mod error;
mod events;
mod runner;

pub use confirm::{Confirmation, ConfirmationPoller};
pub use driver::{DriverSettings, LifecycleDriver, Parked, Step, TaskOutcome};
pub use error::EngineError;
pub use events::{ChannelNotifier, NoopNotifier, WorkerEvent, WorkerNotifier};
pub use runner::WorkerRunner;
