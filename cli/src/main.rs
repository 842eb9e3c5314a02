//! coffer — command-line client for a personal account on a remote bank
//! contract.

mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use coffer_types::Address;
use coffer_utils::LogFormat;
use coffer_wallet_core::{
    LedgerClient, LedgerGateway, ReadModelStore, RpcProvider, Snapshot,
    TransactionOrchestrator, WalletConnector, WalletSession, WriteRequest,
};

use config::CliConfig;

#[derive(Parser)]
#[command(name = "coffer", about = "Client for a personal account on a remote bank contract")]
struct Cli {
    /// JSON-RPC endpoint of the ledger node.
    #[arg(long, env = "COFFER_ENDPOINT")]
    endpoint: Option<String>,

    /// Address of the bank contract.
    #[arg(long, env = "COFFER_CONTRACT")]
    contract: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "COFFER_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "COFFER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Give up waiting for a confirmation after this many seconds.
    /// The transaction keeps running on the network. 0 waits forever.
    #[arg(long, env = "COFFER_CONFIRMATION_TIMEOUT_SECS")]
    confirmation_timeout_secs: Option<u64>,

    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Show the bank name, its owner and your balance.
    Status,
    /// Deposit tokens into your bank account.
    Deposit { amount: String },
    /// Withdraw tokens from your bank account.
    Withdraw { amount: String },
    /// Rename the bank. The contract only accepts this from the owner.
    SetName { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => CliConfig::from_toml_file(&path.to_string_lossy())?,
        None => CliConfig::default(),
    };
    let config = CliConfig {
        endpoint: cli.endpoint.unwrap_or(base.endpoint),
        contract: cli.contract.unwrap_or(base.contract),
        log_format: cli.log_format.unwrap_or(base.log_format),
        log_level: cli.log_level.unwrap_or(base.log_level),
        confirmation_timeout_secs: cli
            .confirmation_timeout_secs
            .unwrap_or(base.confirmation_timeout_secs),
        poll_interval_ms: base.poll_interval_ms,
    };

    fn parse_format(s: &str) -> LogFormat {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Human,
        }
    }
    coffer_utils::init_logging(parse_format(&config.log_format), &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!("loaded config from {}", path.display());
    }

    if config.contract.is_empty() {
        anyhow::bail!(
            "no contract address configured; pass --contract or set it in the config file"
        );
    }
    let contract = Address::parse(&config.contract)?;

    let provider = RpcProvider::new(config.endpoint.clone())?;
    let connector = WalletConnector::new(provider);
    let session = connector.connect().await?;

    let ledger = LedgerClient::connect(config.endpoint.clone(), contract, session.clone())
        .await?
        .with_poll_interval(Duration::from_millis(config.poll_interval_ms));
    let gateway: Arc<dyn LedgerGateway> = Arc::new(ledger);
    let store = ReadModelStore::new(Arc::clone(&gateway), session.address().clone());
    let timeout = match config.confirmation_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let orchestrator =
        TransactionOrchestrator::new(gateway, Arc::clone(&store), session.clone(), timeout);

    match cli.command {
        Command::Status => {
            let snapshot = store.refresh().await;
            print_status(&session, &snapshot);
        }
        Command::Deposit { amount } => {
            let receipt = orchestrator
                .submit(WriteRequest::Deposit { amount })
                .await?;
            println!("deposit confirmed (tx {})", receipt.hash);
            print_balance(&store.snapshot());
        }
        Command::Withdraw { amount } => {
            let receipt = orchestrator
                .submit(WriteRequest::Withdraw { amount })
                .await?;
            println!("withdrawal confirmed (tx {})", receipt.hash);
            print_balance(&store.snapshot());
        }
        Command::SetName { name } => {
            let receipt = orchestrator
                .submit(WriteRequest::SetName { name })
                .await?;
            println!("bank renamed (tx {})", receipt.hash);
            if let Some(name) = &store.snapshot().bank_name {
                println!("bank: {name}");
            }
        }
    }

    Ok(())
}

fn print_status(session: &WalletSession, snapshot: &Snapshot) {
    println!("account: {}", session.address().short());
    match &snapshot.bank_name {
        Some(name) if name.is_empty() => println!("bank:    (unnamed)"),
        Some(name) => println!("bank:    {name}"),
        None => println!("bank:    unknown"),
    }
    match &snapshot.owner {
        Some(owner) if snapshot.is_owner(session.address()) => {
            println!("owner:   {} (you)", owner.short())
        }
        Some(owner) => println!("owner:   {}", owner.short()),
        None => println!("owner:   unknown"),
    }
    match &snapshot.balance {
        Some(balance) => println!("balance: {}", balance.format_decimal()),
        None => println!("balance: unknown"),
    }
    if snapshot.bank_name.as_deref() == Some("") && snapshot.is_owner(session.address()) {
        println!();
        println!("set up the name of your bank");
    }
    for (field, error) in [
        ("bank name", &snapshot.name_error),
        ("owner", &snapshot.owner_error),
        ("balance", &snapshot.balance_error),
    ] {
        if let Some(reason) = error {
            eprintln!("warning: {field} read failed ({reason}); showing last known value");
        }
    }
}

fn print_balance(snapshot: &Snapshot) {
    if let Some(balance) = &snapshot.balance {
        println!("balance: {}", balance.format_decimal());
    }
}
