//! GST Foundation backend server

use anyhow::Context;
use clap::Parser;
use gst_foundation::config::AppConfig;
use gst_foundation::core::ConnectionManager;
use gst_foundation::server::ServerBuilder;
use gst_foundation::storage::{InMemoryDocumentStore, InMemoryGraphStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gst-foundation")]
#[command(about = "Connectivity backend for the MongoDB document store and Neo4j graph store")]
struct Cli {
    /// YAML configuration file; environment variables override it
    #[arg(short, long)]
    config: Option<String>,

    /// Bind host (overrides APP_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides APP_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Serve from in-memory stores instead of MongoDB and Neo4j
    #[arg(long)]
    in_memory: bool,

    /// Run in verbose mode
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_yaml_file_with_env(path)
            .with_context(|| format!("failed to load configuration from {}", path))?,
        None => AppConfig::from_env().context("failed to load configuration")?,
    };
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let connections = if cli.in_memory {
        tracing::info!("Using in-memory stores");
        ConnectionManager::new(
            Arc::new(InMemoryDocumentStore::new()),
            Arc::new(InMemoryGraphStore::new()),
        )
        .with_ping_timeout(config.ping_timeout())
    } else {
        ConnectionManager::connect(&config).await
    };

    let addr = config.server.addr();
    tracing::info!("Starting GST Foundation backend on http://{}", addr);

    ServerBuilder::new()
        .with_connections(connections)
        .serve(&addr)
        .await
}
