use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockroom::catalog::fs::{DirectoryCatalog, FileCatalog};
use stockroom::catalog::{Catalog, SnapshotStore};
use stockroom::config::{CatalogConfig, Config, Overrides};

/// Mirror server for the extension marketplace gallery
#[derive(Parser, Debug)]
#[command(name = "stockroom")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Bind address
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Port number
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Public origin asset URIs are rewritten to
    #[arg(long, value_name = "URL")]
    origin: Option<String>,

    /// Root of mirrored artifacts
    #[arg(long, value_name = "PATH")]
    artifacts: Option<PathBuf>,

    /// Load the catalog from a single JSON file instead of the artifacts tree
    #[arg(long, value_name = "FILE")]
    catalog_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hyper=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration
    let overrides = Overrides {
        bind: args.bind,
        port: args.port,
        origin: args.origin,
        artifacts: args.artifacts,
        catalog_file: args.catalog_file,
    };
    let config = Config::load(args.config.as_ref(), &overrides)?;

    info!("Configuration loaded: bind={}:{}", config.bind, config.port);

    // Create catalog
    let catalog: Arc<dyn Catalog> = match config.catalog() {
        CatalogConfig::Directory { path } => {
            info!("Using catalog directory at: {}", path.display());
            Arc::new(DirectoryCatalog::new(path))
        }
        CatalogConfig::File { path } => {
            info!("Using catalog file at: {}", path.display());
            Arc::new(FileCatalog::new(path))
        }
    };

    // Load the first snapshot before accepting requests
    let store = Arc::new(SnapshotStore::new(catalog));
    store.refresh().await?;

    // Start server
    stockroom::api::run(config, store).await
}
