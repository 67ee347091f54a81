//! NDBC buoy data ingester service.
//!
//! Polls NOAA NDBC's public text feeds (station table, latest
//! observations) on an hourly cadence and upserts stations and
//! measurements into PostgreSQL, logging each run for observability.

mod config;
mod fetch;
mod pipeline;
mod server;

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::IngesterConfig;
use pipeline::IngestionPipeline;
use server::ServerState;

#[derive(Parser, Debug)]
#[command(name = "ingester")]
#[command(about = "NDBC buoy data ingester for the ocean monitoring dashboard")]
struct Args {
    /// Run once and exit (vs continuous polling)
    #[arg(long)]
    once: bool,

    /// Also backfill ~45-day realtime history for key stations
    #[arg(long)]
    historical: bool,

    /// Specific station IDs to backfill history for (comma-separated)
    #[arg(long, value_delimiter = ',')]
    stations: Vec<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting NDBC ingester");

    // Load configuration, letting CLI flags override the environment
    let mut config = IngesterConfig::from_env()?;
    if args.historical {
        config.backfill_history = true;
    }
    if !args.stations.is_empty() {
        config.historical_stations = args.stations.clone();
    }
    info!(
        base_url = %config.ndbc_base_url,
        poll_interval_secs = config.poll_interval_secs,
        backfill_history = config.backfill_history,
        "Loaded configuration"
    );

    let pipeline = IngestionPipeline::new(&config).await?;

    if args.once {
        // Single run mode: behaves identically to one scheduled cycle
        info!("Running single ingestion cycle");
        let summary = pipeline.run_once().await?;
        info!(
            stations = summary.stations_written,
            measurements = summary.measurements_written,
            "Single cycle complete"
        );
    } else {
        // Continuous polling mode with the status server alongside
        let state = Arc::new(ServerState {
            store: pipeline.store().clone(),
        });
        let port = config.server_port;
        tokio::spawn(async move {
            if let Err(e) = server::start_server(state, port).await {
                tracing::error!(error = %e, "Status server exited");
            }
        });

        info!("Starting continuous polling");
        pipeline.run_forever().await?;
    }

    Ok(())
}
