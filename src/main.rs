use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use zentra_artifact::ProofPublisher;
use zentra_config::{AcceptanceConfig, TaskCategory, WorkerConfig};
use zentra_engine::{LifecycleDriver, WorkerRunner};
use zentra_extract::AnthropicExtractor;
use zentra_fetch::HttpFetcher;
use zentra_ledger::{EscrowLedger, Ledger};
use zentra_task::{Router, evaluate};

/// Zentra - an autonomous worker for an on-chain task escrow
#[derive(Parser)]
#[command(name = "zentra")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the config file (default: ~/.zentra/config.json)
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  /// Log at debug level unless RUST_LOG says otherwise
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Watch the ledger and fulfil new tasks until interrupted
  Run,

  /// Print the on-chain status of tasks
  Check {
    /// Task ids to look up
    #[arg(required = true)]
    ids: Vec<u64>,
  },

  /// Classify a task description and show whether it would be accepted
  Classify {
    /// The task description
    description: String,
  },

  /// Execute a task description locally and print the result (no publishing,
  /// no transactions)
  Execute {
    /// Task id recorded in the result
    #[arg(long, default_value_t = 0)]
    task_id: u64,

    /// The task description
    description: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  let config_path = match cli.config {
    Some(path) => path,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".zentra")
      .join("config.json"),
  };

  match cli.command {
    Some(Commands::Run) => block_on(run(config_path)),
    Some(Commands::Check { ids }) => block_on(check(config_path, ids)),
    Some(Commands::Classify { description }) => classify(&config_path, &description),
    Some(Commands::Execute {
      task_id,
      description,
    }) => block_on(execute(config_path, task_id, description)),
    None => {
      println!("zentra - use --help to see available commands");
      Ok(())
    }
  }
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(future)
}

/// Load and validate the config. Any problem here is fatal.
fn load_config(path: &Path) -> Result<WorkerConfig> {
  let config = WorkerConfig::from_file(path)
    .with_context(|| format!("failed to load config: {}", path.display()))?;
  config
    .validate()
    .with_context(|| format!("invalid config: {}", path.display()))?;
  Ok(config)
}

async fn connect(config: &WorkerConfig) -> Result<Arc<dyn Ledger>> {
  let private_key = config
    .wallet_private_key
    .as_deref()
    .context("no signing key configured")?;

  let ledger = EscrowLedger::connect(
    &config.rpc_url,
    config.contract_address,
    private_key,
    config.chain_id,
  )
  .await
  .with_context(|| format!("failed to connect to ledger at {}", config.rpc_url))?;

  Ok(Arc::new(ledger))
}

fn router(config: &WorkerConfig, ledger: Arc<dyn Ledger>) -> Result<Router> {
  let fetcher = HttpFetcher::new(config.fetch.clone()).context("failed to build http client")?;
  let extractor =
    AnthropicExtractor::new(config.extraction.clone()).context("failed to build extraction client")?;

  if !extractor.is_configured() {
    warn!("no extraction API key configured; results will be degraded");
  }

  Ok(
    Router::new(Arc::new(fetcher), Arc::new(extractor), ledger)
      .with_capabilities(config.capabilities.clone())
      .with_acceptance(config.acceptance.clone())
      .with_max_tokens(config.extraction.max_tokens),
  )
}

async fn run(config_path: PathBuf) -> Result<()> {
  let config = load_config(&config_path)?;
  let ledger = connect(&config).await?;

  info!(
    account = %ledger.account(),
    contract = %config.contract_address,
    capabilities = ?config.capabilities,
    "worker identity"
  );

  let router = router(&config, ledger.clone())?;
  let proofs = ProofPublisher::from_config(&config.proof).context("failed to build proof publisher")?;
  let driver = LifecycleDriver::new(ledger, router, proofs, &config);
  let runner = WorkerRunner::new(driver, config.polling_interval())
    .with_startup_sweep(config.scan_open_tasks_on_start);

  let cancel = CancellationToken::new();
  let on_signal = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      info!("interrupt received, shutting down");
      on_signal.cancel();
    }
  });

  runner.start(cancel).await;
  Ok(())
}

async fn check(config_path: PathBuf, ids: Vec<u64>) -> Result<()> {
  let config = load_config(&config_path)?;
  let ledger = connect(&config).await?;

  for id in ids {
    match ledger.task(id).await {
      Ok(task) => {
        println!("Task #{}", task.id);
        println!("  status:      {}", task.status);
        println!("  employer:    {}", task.employer);
        match task.worker {
          Some(worker) => println!("  worker:      {}", worker),
          None => println!("  worker:      (none)"),
        }
        println!("  payment:     {}", task.payment);
        println!("  description: {}", task.description);
        if !task.proof_url.is_empty() {
          println!("  proof:       {}", task.proof_url);
        }
      }
      Err(e) => eprintln!("Task #{}: {}", id, e),
    }
  }

  Ok(())
}

/// Classification needs no ledger or credentials; the config file is only
/// read, if present, for the capability list and acceptance policy.
fn classify(config_path: &Path, description: &str) -> Result<()> {
  let (capabilities, acceptance) = if config_path.exists() {
    let config = WorkerConfig::from_file(config_path)
      .with_context(|| format!("failed to load config: {}", config_path.display()))?;
    (config.capabilities, config.acceptance)
  } else {
    (TaskCategory::ALL.to_vec(), AcceptanceConfig::default())
  };

  let evaluation = evaluate(description, &capabilities, &acceptance);
  println!("{}", serde_json::to_string_pretty(&evaluation)?);
  Ok(())
}

async fn execute(config_path: PathBuf, task_id: u64, description: String) -> Result<()> {
  let config = load_config(&config_path)?;
  let ledger = connect(&config).await?;
  let router = router(&config, ledger)?;

  let execution = router.execute(task_id, &description).await;
  eprintln!(
    "Classified as {} ({:.2})",
    execution.classification.category, execution.classification.confidence
  );

  println!("{}", serde_json::to_string_pretty(&execution.result)?);
  Ok(())
}
