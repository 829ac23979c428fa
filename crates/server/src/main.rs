//! CloudBoard REST API Server

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cloudboard::commands::CommandExecutor;
use cloudboard::config::CloudBoardConfig;
use cloudboard::storage::{BoardStore, InMemoryStorage, JsonFileStorage};

#[derive(Debug, Parser)]
#[command(name = "cloudboard-server", version, about = "REST API server for CloudBoard")]
struct Args {
    /// Directory holding config.toml and the data files
    #[arg(long, env = "CLOUDBOARD_DATA_DIR", default_value = ".cloudboard")]
    data_dir: PathBuf,

    /// Address to listen on; overrides `[server] bind`
    #[arg(long, env = "CLOUDBOARD_BIND")]
    bind: Option<String>,

    /// Keep everything in memory; nothing is written to the data directory
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let config = CloudBoardConfig::load(&args.data_dir)
        .with_context(|| format!("Failed to load config from {}", args.data_dir.display()))?;
    let addr = args.bind.clone().unwrap_or_else(|| config.bind());

    info!("Starting CloudBoard API Server...");
    if args.in_memory {
        info!("Using in-memory storage");
        serve(InMemoryStorage::new(), config, &addr).await
    } else {
        info!("Using data directory at: {}", args.data_dir.display());
        let storage = JsonFileStorage::with_lock_timeout(&args.data_dir, config.lock_timeout());
        serve(storage, config, &addr).await
    }
}

async fn serve<S: BoardStore>(storage: S, config: CloudBoardConfig, addr: &str) -> Result<()> {
    let executor = CommandExecutor::with_config(storage, config);
    executor.init().context("Failed to initialize storage")?;

    let app = cloudboard_server::app(Arc::new(executor));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
