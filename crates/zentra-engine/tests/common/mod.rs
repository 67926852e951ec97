#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use zentra_artifact::{ProofPublisher, PublishError, Publisher};
use zentra_config::WorkerConfig;
use zentra_engine::{LifecycleDriver, WorkerNotifier};
use zentra_extract::{ExtractionRequest, Extractor, Outcome};
use zentra_fetch::{Fetch, FetchError, Page};
use zentra_ledger::{Address, MemoryLedger};
use zentra_task::Router;

pub const PLACEHOLDER: &str = "https://zentra.vercel.app";

pub fn me() -> Address {
  Address::repeat_byte(0x11)
}

pub fn ledger() -> Arc<MemoryLedger> {
  let ledger = MemoryLedger::new(me());
  ledger.set_height(100);
  Arc::new(ledger)
}

pub fn config(extra: &str) -> WorkerConfig {
  let json = format!(
    r#"{{
      "rpc_url": "http://127.0.0.1:8545",
      "contract_address": "0xA0A261A70C0904142804CF20C752f67BA57236d1",
      "monitor": {{ "window": 75, "lookback": 75 }},
      "confirmation": {{ "initial_delay_ms": 1000, "interval_ms": 500, "max_attempts": 4 }}
      {}
    }}"#,
    extra
  );
  WorkerConfig::from_json(&json).expect("test config")
}

/// Every fetch fails.
pub struct OfflineFetcher;

#[async_trait]
impl Fetch for OfflineFetcher {
  async fn fetch(&self, _url: &str) -> Result<Page, FetchError> {
    Err(FetchError::Timeout { timeout_ms: 15_000 })
  }
}

/// Every extraction degrades.
pub struct NoExtractor;

#[async_trait]
impl Extractor for NoExtractor {
  async fn extract(&self, _request: ExtractionRequest) -> Outcome<serde_json::Value> {
    Outcome::Degraded("no API key".to_string())
  }
}

/// Hosts every proof at the same URL, or fails every upload.
pub struct StaticPublisher(pub Option<&'static str>);

#[async_trait]
impl Publisher for StaticPublisher {
  async fn publish(&self, _body: &str) -> Result<String, PublishError> {
    match self.0 {
      Some(url) => Ok(url.to_string()),
      None => Err(PublishError::UnexpectedResponse {
        body: "offline".to_string(),
      }),
    }
  }
}

pub fn driver_with<N: WorkerNotifier>(
  ledger: Arc<MemoryLedger>,
  config: &WorkerConfig,
  hosted: Option<&'static str>,
  notifier: N,
) -> LifecycleDriver<N> {
  let router = Router::new(Arc::new(OfflineFetcher), Arc::new(NoExtractor), ledger.clone())
    .with_capabilities(config.capabilities.clone())
    .with_acceptance(config.acceptance.clone());
  let proofs = ProofPublisher::new(Arc::new(StaticPublisher(hosted)), PLACEHOLDER);
  LifecycleDriver::with_notifier(ledger, router, proofs, config, notifier)
}
