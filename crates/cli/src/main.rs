use clap::{Parser, Subcommand};
use std::sync::atomic::Ordering;

use equity_snap_core::{load_universe, ConfigLoader};
use equity_snap_ingest::{Ingestor, RequestPacer};
use equity_snap_screener::ScreenerClient;
use equity_snap_storage::{new_run_id, SnapshotStore};
use equity_snap_yahoo::YahooClient;

#[derive(Parser)]
#[command(name = "equity-snap")]
#[command(about = "Market snapshot collector for a fixed symbol universe", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one full ingestion pass and publish a snapshot
    Run {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,

        /// Override the universe file from the config
        #[arg(long)]
        universe: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level))
    };
    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(env_filter()).init();
        }
    }

    match cli.command {
        Commands::Run { config, universe } => {
            run_collector(&config, universe.as_deref()).await?;
        }
    }

    Ok(())
}

/// Builds the per-run components, runs the pass, persists the snapshot.
async fn run_collector(config_path: &str, universe_override: Option<&str>) -> anyhow::Result<()> {
    let config = ConfigLoader::load(config_path)?;
    let universe_file = universe_override.unwrap_or(&config.run.universe_file);
    let universe = load_universe(universe_file)?;

    let ingestor = Ingestor::new(
        ScreenerClient::new(&config.screener),
        YahooClient::new(&config.yahoo),
        RequestPacer::new(config.screener.pacing),
        config.screener.retry,
        config.yahoo.retry,
    );

    // Ctrl-C stops the run at the next symbol boundary; whatever has been
    // collected is still persisted, marked partial in the manifest.
    let abort = ingestor.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current symbol");
            abort.store(true, Ordering::SeqCst);
        }
    });

    let run_id = new_run_id();
    tracing::info!(
        run_id = %run_id,
        symbols = universe.len(),
        "Starting snapshot collection"
    );

    let output = ingestor.ingest(&universe).await;
    let summary = output.stats.summary();

    let store = SnapshotStore::new(&config.storage.root);
    let paths = store.persist(&run_id, &output.financials, &output.prices, &summary)?;

    tracing::info!(
        run_id = %run_id,
        financials = %paths.financials.display(),
        prices = %paths.prices.display(),
        manifest = %paths.manifest.display(),
        complete = summary.complete,
        "Snapshot published"
    );

    Ok(())
}
