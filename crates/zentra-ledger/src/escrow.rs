//! Escrow contract client over EVM JSON-RPC.

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::types::{BlockSummary, Receipt, Task, TaskCreated, TaskStatus, non_zero, task_id_from};

sol! {
  #[sol(rpc)]
  contract TaskEscrow {
    struct TaskRecord {
      uint256 taskId;
      address employer;
      address worker;
      uint256 payment;
      address token;
      string description;
      string proofUrl;
      uint8 status;
    }

    event TaskCreated(
      uint256 indexed taskId,
      address indexed employer,
      uint256 payment,
      address token,
      string description
    );

    function getTask(uint256 _taskId) external view returns (TaskRecord memory);
    function getTasks() external view returns (TaskRecord[] memory);
    function acceptTask(uint256 _taskId) external;
    function submitWork(uint256 _taskId, string _proofUrl) external;
  }
}

/// [`Ledger`] implementation backed by the deployed escrow contract.
pub struct EscrowLedger {
  provider: DynProvider,
  contract: TaskEscrow::TaskEscrowInstance<DynProvider>,
  account: Address,
}

impl EscrowLedger {
  /// Connect to `rpc_url`, signing writes with `private_key`.
  ///
  /// When `chain_id` is given it is checked against the node so a worker
  /// pointed at the wrong network fails at startup rather than on first write.
  pub async fn connect(
    rpc_url: &str,
    contract_address: Address,
    private_key: &str,
    chain_id: Option<u64>,
  ) -> Result<Self, LedgerError> {
    let signer = private_key
      .trim()
      .parse::<PrivateKeySigner>()
      .map_err(|e| LedgerError::Config {
        message: format!("invalid signing key: {}", e),
      })?;
    let account = signer.address();

    let url = url::Url::parse(rpc_url).map_err(|e| LedgerError::Config {
      message: format!("invalid rpc url '{}': {}", rpc_url, e),
    })?;

    let provider = ProviderBuilder::new()
      .wallet(signer)
      .connect_http(url)
      .erased();

    if let Some(expected) = chain_id {
      let actual = provider.get_chain_id().await.map_err(rpc_error)?;
      if actual != expected {
        return Err(LedgerError::Config {
          message: format!("chain id mismatch: expected {}, node reports {}", expected, actual),
        });
      }
    }

    let contract = TaskEscrow::new(contract_address, provider.clone());

    info!(
      account = %account,
      contract = %contract_address,
      "connected to escrow contract"
    );

    Ok(Self {
      provider,
      contract,
      account,
    })
  }
}

#[async_trait]
impl Ledger for EscrowLedger {
  fn account(&self) -> Address {
    self.account
  }

  async fn block_height(&self) -> Result<u64, LedgerError> {
    self.provider.get_block_number().await.map_err(rpc_error)
  }

  async fn block_summary(&self, height: u64) -> Result<Option<BlockSummary>, LedgerError> {
    let block = self
      .provider
      .get_block_by_number(BlockNumberOrTag::Number(height))
      .await
      .map_err(rpc_error)?;

    Ok(block.map(|block| BlockSummary {
      block_number: block.header.number,
      tx_count: block.transactions.len(),
      gas_used: block.header.gas_used,
      timestamp: block.header.timestamp,
    }))
  }

  async fn task(&self, task_id: u64) -> Result<Task, LedgerError> {
    let record = self
      .contract
      .getTask(U256::from(task_id))
      .call()
      .await
      .map_err(contract_error)?;

    // The contract returns an all-zero record for ids it never assigned.
    if record.employer == Address::ZERO {
      return Err(LedgerError::TaskNotFound(task_id));
    }

    task_from_record(record)
  }

  async fn tasks(&self) -> Result<Vec<Task>, LedgerError> {
    let records = self
      .contract
      .getTasks()
      .call()
      .await
      .map_err(contract_error)?;

    records.into_iter().map(task_from_record).collect()
  }

  async fn task_created_events(
    &self,
    from: u64,
    to: u64,
  ) -> Result<Vec<TaskCreated>, LedgerError> {
    let logs = self
      .contract
      .TaskCreated_filter()
      .from_block(from)
      .to_block(to)
      .query()
      .await
      .map_err(contract_error)?;

    debug!(from, to, count = logs.len(), "fetched TaskCreated logs");

    logs
      .into_iter()
      .map(|(event, log)| {
        Ok(TaskCreated {
          task_id: task_id_from(event.taskId)?,
          employer: event.employer,
          payment: event.payment,
          token: event.token,
          description: event.description,
          block_number: log.block_number,
        })
      })
      .collect()
  }

  async fn receipt(&self, tx_hash: TxHash) -> Result<Option<Receipt>, LedgerError> {
    let receipt = self
      .provider
      .get_transaction_receipt(tx_hash)
      .await
      .map_err(rpc_error)?;

    Ok(receipt.map(|r| Receipt {
      tx_hash,
      block_number: r.block_number,
      success: r.status(),
    }))
  }

  async fn accept_task(&self, task_id: u64) -> Result<TxHash, LedgerError> {
    let pending = self
      .contract
      .acceptTask(U256::from(task_id))
      .send()
      .await
      .map_err(contract_error)?;

    let tx_hash = *pending.tx_hash();
    info!(task_id, tx_hash = %tx_hash, "acceptTask sent");
    Ok(tx_hash)
  }

  async fn submit_work(&self, task_id: u64, proof_url: &str) -> Result<TxHash, LedgerError> {
    let pending = self
      .contract
      .submitWork(U256::from(task_id), proof_url.to_string())
      .send()
      .await
      .map_err(contract_error)?;

    let tx_hash = *pending.tx_hash();
    info!(task_id, tx_hash = %tx_hash, proof_url, "submitWork sent");
    Ok(tx_hash)
  }
}

fn task_from_record(record: TaskEscrow::TaskRecord) -> Result<Task, LedgerError> {
  Ok(Task {
    id: task_id_from(record.taskId)?,
    employer: record.employer,
    worker: non_zero(record.worker),
    payment: record.payment,
    token: record.token,
    description: record.description,
    proof_url: record.proofUrl,
    status: TaskStatus::try_from(record.status)?,
  })
}

fn rpc_error(e: impl std::fmt::Display) -> LedgerError {
  LedgerError::Rpc {
    message: e.to_string(),
  }
}

fn contract_error(e: alloy::contract::Error) -> LedgerError {
  LedgerError::Contract {
    message: e.to_string(),
  }
}
