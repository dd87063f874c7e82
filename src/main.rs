//! Model Workflows - Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use model_workflows::{
    FileSystemStorage, HashStore, HttpRemoteSource, MetadataCache, api, config::ServiceConfig,
    metrics,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;

#[derive(Parser, Debug)]
#[command(name = "model-workflows")]
#[command(about = "Checkpoint metadata matching service", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override API port
    #[arg(long)]
    port: Option<u16>,

    /// Additional checkpoint directory to scan (repeatable)
    #[arg(long = "checkpoint-dir")]
    checkpoint_dirs: Vec<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log format (json or pretty)
    #[arg(long, default_value = "json")]
    log_format: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    match cli.log_format.as_str() {
        "pretty" => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(&cli.log_level)
                .json()
                .init();
        }
    }

    tracing::info!("Starting Model Workflows service");

    // Load configuration
    let mut config = ServiceConfig::load(cli.config)?;

    // CLI overrides
    if let Some(port) = cli.port {
        config.api_port = port;
    }
    config.checkpoint_dirs.extend(cli.checkpoint_dirs);

    config.validate()?;

    tracing::info!(
        api_port = config.api_port,
        data_dir = ?config.data_dir,
        checkpoint_dirs = ?config.checkpoint_dirs,
        "Configuration loaded"
    );

    // Setup metrics
    let prometheus_handle = metrics::setup_metrics()?;

    // Wire up persistence and the remote dataset source
    let storage = Arc::new(FileSystemStorage::new());

    let hash_store = Arc::new(
        HashStore::open(config.hash_store_path(), storage.clone())
            .await
            .context("Failed to open hash store")?,
    );

    let remote = Arc::new(
        HttpRemoteSource::new(
            config.latest_url.clone(),
            config.snapshot_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
        .context("Failed to build HTTP client")?,
    );

    let metadata_cache = Arc::new(MetadataCache::new(
        config.marker_path(),
        config.snapshot_path(),
        remote,
        storage,
    ));

    // Setup API
    let app_state = api::AppState {
        config: Arc::new(config.clone()),
        hash_store,
        metadata_cache,
        prometheus_handle,
    };

    let app = api::create_router(app_state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.api_port));
    tracing::info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind API server")?;

    // Graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server error")?;

    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
