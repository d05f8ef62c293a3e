//! ripplectl: the crawl coordinator's server entry point.

use clap::{Parser, Subcommand};
use ripplectl::collaborators::{FsBlobStore, SqlitePageMetadataStore};
use ripplectl::config::load_process_config_with_hash;
use ripplectl::persistence::SqliteStore;
use ripplectl::registry::RunRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// ripplectl: control-plane coordinator for a distributed web crawler
#[derive(Parser, Debug)]
#[command(name = "ripplectl")]
#[command(version = "0.1.0")]
#[command(about = "Control-plane coordinator for a distributed web crawler", long_about = None)]
struct Cli {
    /// Path to the coordinator's TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the config file and exit without starting the server
    #[arg(long)]
    check_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (the default when no subcommand is given)
    Serve,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("loading configuration from {}", cli.config.display());
    let (config, hash) = load_process_config_with_hash(&cli.config)?;
    tracing::info!(config_hash = %hash, "configuration loaded");

    if cli.check_config {
        println!("configuration is valid");
        println!("  bind address: {}", config.bind_address);
        println!("  database path: {}", config.database_path);
        println!("  maintenance tick: {}s", config.maintenance_tick_seconds);
        return Ok(());
    }

    let storage = Arc::new(SqliteStore::open(std::path::Path::new(&config.database_path))?);
    let registry = RunRegistry::new(storage);

    let blob_root = PathBuf::from(&config.database_path)
        .parent()
        .map(|parent| parent.join("blobs"))
        .unwrap_or_else(|| PathBuf::from("blobs"));
    let blob = Arc::new(FsBlobStore::new(blob_root));

    let metadata_path = {
        let mut path = PathBuf::from(&config.database_path);
        path.set_extension("metadata.db");
        path
    };
    let metadata = Arc::new(SqlitePageMetadataStore::open(&metadata_path)?);

    let state = ripplectl::api::AppState { registry: registry.clone(), blob, metadata };
    let app = ripplectl::api::router(state, Duration::from_secs(120));

    let tick_interval = Duration::from_secs(config.maintenance_tick_seconds);
    tokio::spawn(maintenance_ticker(registry, tick_interval));

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

/// Drives the maintenance tick (spec's "any scheduler" note) across every
/// run this process has touched, on a fixed interval. A tick failure on one
/// run is logged and does not stop the ticker from reaching the next run.
async fn maintenance_ticker(registry: RunRegistry, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        for run_id in registry.known_run_ids().await {
            let handle = match registry.handle_for(&run_id).await {
                Ok(handle) => handle,
                Err(err) => {
                    tracing::warn!(run_id = %run_id, error = %err, "maintenance tick: failed to reach run");
                    continue;
                }
            };
            if let Err(err) = handle.on_cron().await {
                tracing::warn!(run_id = %run_id, error = %err, "maintenance tick failed");
            }
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripplectl=info,warn"),
            1 => EnvFilter::new("ripplectl=debug,info"),
            2 => EnvFilter::new("ripplectl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
