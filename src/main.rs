use anyhow::Context;
use clap::Parser;
use learngraph_api::RestApi;
use learngraph_core::ProgressTracker;
use learngraph_storage::StorageManager;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Knowledge graph backend for a learning platform
#[derive(Parser, Debug)]
#[command(name = "learngraph")]
#[command(about = "Knowledge graph progression server", long_about = None)]
struct Args {
    /// Path to the data directory
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// Graph seed (.json or .json.gz) that replaces the stored graph before startup
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting learngraph v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);
    info!("HTTP API port: {}", args.http_port);

    let storage = Arc::new(StorageManager::new(&args.data_dir)?);
    info!("Storage initialized");

    if let Some(seed) = &args.seed {
        storage
            .import_seed(seed)
            .with_context(|| format!("failed to import graph seed {:?}", seed))?;
    }

    // A partial graph would hand out wrong eligibility, so refuse to start
    let graph = Arc::new(storage.load_graph().context("failed to load knowledge graph")?);
    let tracker = Arc::new(ProgressTracker::new(graph, storage.clone()));

    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(tracker, storage, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("learngraph started successfully");
    info!("HTTP API: http://localhost:{}/", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
