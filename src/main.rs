use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payment_service::application::engine::PaymentEngine;
use payment_service::config::ServiceConfig;
use payment_service::error::PaymentError;
use payment_service::domain::ports::PaymentStoreBox;
use payment_service::infrastructure::in_memory::InMemoryPaymentStore;
use payment_service::infrastructure::seed::seed_demo_data;
use payment_service::infrastructure::simulator::SettlementSimulator;
use payment_service::interfaces::jsonl::reply_writer::ReplyWriter;
use payment_service::interfaces::jsonl::request_reader::RequestReader;
use payment_service::interfaces::rpc::service::{PaymentService, RpcReply};
use payment_service::interfaces::rpc::status::Status;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Newline-delimited JSON requests, or `-` to read stdin
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Probability (0 to 1) that a settlement fails
    #[arg(long)]
    failure_rate: Option<f64>,

    /// Disable the simulated gateway latency
    #[arg(long)]
    no_delay: bool,

    /// Seed for the settlement random generator
    #[arg(long)]
    rng_seed: Option<u64>,

    /// Load sample payments when the store is empty
    #[arg(long)]
    seed_demo_data: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn load_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::from_file(path).into_diagnostic()?,
        None => ServiceConfig::default(),
    };
    if let Some(rate) = cli.failure_rate {
        config.settlement.failure_probability = rate;
    }
    if cli.no_delay {
        config.settlement = config.settlement.without_delay();
    }
    config.validate().into_diagnostic()?;
    Ok(config)
}

#[cfg(feature = "storage-rocksdb")]
fn open_store(db_path: Option<PathBuf>) -> Result<PaymentStoreBox> {
    use payment_service::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            info!(path = %path.display(), "Using RocksDB storage");
            let store = RocksDBStore::open(path).into_diagnostic()?;
            Ok(Box::new(store))
        }
        None => Ok(Box::new(InMemoryPaymentStore::new())),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_store(db_path: Option<PathBuf>) -> Result<PaymentStoreBox> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
        );
    }
    Ok(Box::new(InMemoryPaymentStore::new()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = load_config(&cli)?;
    let store = open_store(cli.db_path.clone())?;

    if cli.seed_demo_data {
        seed_demo_data(store.as_ref(), chrono::Utc::now())
            .await
            .into_diagnostic()?;
    }

    let simulator = match cli.rng_seed {
        Some(seed) => {
            SettlementSimulator::with_rng(config.settlement.clone(), StdRng::seed_from_u64(seed))
        }
        None => SettlementSimulator::new(config.settlement.clone()),
    };
    let engine = PaymentEngine::new(store, Box::new(simulator)).with_limits(config.limits);
    let service = PaymentService::new(Arc::new(engine));

    info!(
        failure_probability = config.settlement.failure_probability,
        "Payment service ready"
    );

    let source: Box<dyn Read> = if cli.input.as_os_str() == "-" {
        Box::new(io::stdin())
    } else {
        Box::new(File::open(&cli.input).into_diagnostic()?)
    };
    let reader = RequestReader::new(source);

    let stdout = io::stdout();
    let mut writer = ReplyWriter::new(stdout.lock());
    let mut failed = 0usize;
    for request in reader.requests() {
        let reply = match request {
            Ok(request) => service.dispatch(request).await,
            Err(PaymentError::InvalidInput(message)) => {
                warn!(error = %message, "Malformed request");
                RpcReply::Error {
                    error: Status::invalid_argument(message),
                }
            }
            Err(e) => {
                writer.flush().into_diagnostic()?;
                return Err(e).into_diagnostic();
            }
        };
        if reply.is_error() {
            failed += 1;
        }
        writer.write_reply(&reply).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()?;

    info!(failed, "All requests processed");
    Ok(())
}
