//! Zentra Config
//!
//! This crate contains the serializable configuration types for the Zentra
//! worker. A worker is configured from a single JSON file, with secrets
//! optionally supplied through the environment instead of the file.
//!
//! ```json
//! {
//!   "rpc_url": "https://testnet-rpc.monad.xyz",
//!   "contract_address": "0xA0A261A70C0904142804CF20C752f67BA57236d1",
//!   "polling_interval_ms": 10000,
//!   "capabilities": ["web_scraping", "research"],
//!   "proof": { "require_hosted": true }
//! }
//! ```
//!
//! Every section has defaults, so only the ledger coordinates and the signing
//! credential are required. [`WorkerConfig::validate`] is run once at startup;
//! a config that fails validation is fatal.

mod enums;
mod error;
mod sections;
mod worker;

pub use enums::{AcceptancePolicy, TaskCategory};
pub use error::ConfigError;
pub use sections::{
  AcceptanceConfig, ConfirmationConfig, ExtractionConfig, FetchConfig, MonitorConfig, ProofConfig,
};
pub use worker::{ANTHROPIC_API_KEY_ENV, PRIVATE_KEY_ENV, WorkerConfig};
