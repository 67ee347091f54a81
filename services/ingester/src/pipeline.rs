//! The ingestion pipeline: fetch, parse, persist, log.

use anyhow::Result;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

use ndbc_parser::{parse_latest_obs, parse_realtime, parse_station_table};
use ocean_common::OceanResult;
use storage::Store;

use crate::config::IngesterConfig;
use crate::fetch::NdbcClient;

/// Counts from one completed ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct RunSummary {
    pub stations_written: u64,
    pub measurements_written: u64,
}

/// Main ingestion pipeline.
///
/// A run is strictly sequential: stations are fetched and upserted
/// before any measurement is written, because measurements reference
/// stations. Runs are independent and idempotent, so overlapping
/// invocations are tolerated (last write wins on the same station).
pub struct IngestionPipeline {
    config: IngesterConfig,
    client: NdbcClient,
    store: Store,
}

impl IngestionPipeline {
    /// Create a new ingestion pipeline, connecting to the database and
    /// applying migrations.
    pub async fn new(config: &IngesterConfig) -> Result<Self> {
        let store = Store::connect(&config.database_url).await?;
        store.migrate().await?;

        let client = NdbcClient::new(&config.ndbc_base_url, config.request_timeout_secs);

        Ok(Self {
            config: config.clone(),
            client,
            store,
        })
    }

    /// The underlying store, shared with the status server.
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Run ingestion cycles forever, sleeping `poll_interval_secs`
    /// between them. A failed cycle is logged and the loop continues;
    /// the next tick is the retry.
    pub async fn run_forever(&self) -> Result<()> {
        let mut last_sweep: Option<Instant> = None;

        loop {
            info!("Starting ingestion cycle");

            if let Err(e) = self.run_once().await {
                error!(error = %e, "Ingestion cycle failed");
            }

            if self.sweep_due(&last_sweep) {
                match self.store.prune_measurements(self.config.retention_days).await {
                    Ok(deleted) => {
                        info!(deleted, "Retention sweep complete");
                        last_sweep = Some(Instant::now());
                    }
                    Err(e) => warn!(error = %e, "Retention sweep failed"),
                }
            }

            info!(
                interval_secs = self.config.poll_interval_secs,
                "Sleeping until next cycle"
            );
            tokio::time::sleep(std::time::Duration::from_secs(
                self.config.poll_interval_secs,
            ))
            .await;
        }
    }

    /// Execute a single ingestion run, bracketed by run-log records.
    ///
    /// A fetch failure marks the run `error` and leaves previously
    /// persisted data untouched; parse and batch failures are absorbed
    /// at lower levels and only reduce the final counts.
    #[instrument(skip(self))]
    pub async fn run_once(&self) -> Result<RunSummary> {
        let run_id = self.store.start_run().await?;

        match self.execute().await {
            Ok(summary) => {
                self.store
                    .finish_run(run_id, summary.stations_written, summary.measurements_written)
                    .await?;
                info!(
                    run_id,
                    stations = summary.stations_written,
                    measurements = summary.measurements_written,
                    "Ingestion run complete"
                );
                Ok(summary)
            }
            Err(e) => {
                if let Err(log_err) = self.store.fail_run(run_id, &e.to_string()).await {
                    warn!(run_id, error = %log_err, "Failed to record run failure");
                }
                Err(e.into())
            }
        }
    }

    async fn execute(&self) -> OceanResult<RunSummary> {
        let station_text = self.client.station_table().await?;
        let stations = parse_station_table(&station_text);
        let stations_written = self.store.upsert_stations(&stations).await?;
        info!(parsed = stations.len(), written = stations_written, "Stations upserted");

        let obs_text = self.client.latest_obs().await?;
        let observations = parse_latest_obs(&obs_text);
        let mut measurements_written = self.store.insert_measurements(&observations).await?;
        info!(
            parsed = observations.len(),
            written = measurements_written,
            "Latest observations inserted"
        );

        if self.config.backfill_history {
            measurements_written += self.backfill_history().await;
        }

        Ok(RunSummary {
            stations_written,
            measurements_written,
        })
    }

    /// Fetch and persist realtime history for the configured stations.
    ///
    /// Best-effort per station: NDBC serves no realtime file for some
    /// codes, and a 404 there is not a run failure.
    async fn backfill_history(&self) -> u64 {
        let mut written = 0u64;

        for station_id in &self.config.historical_stations {
            let text = match self.client.station_realtime(station_id).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(station = %station_id, error = %e, "History fetch failed, skipping station");
                    continue;
                }
            };

            let history = parse_realtime(station_id, &text);
            match self.store.insert_measurements(&history).await {
                Ok(n) => {
                    info!(station = %station_id, rows = n, "Backfilled station history");
                    written += n;
                }
                Err(e) => warn!(station = %station_id, error = %e, "History insert failed"),
            }
        }

        written
    }

    fn sweep_due(&self, last_sweep: &Option<Instant>) -> bool {
        match last_sweep {
            None => true,
            Some(at) => at.elapsed().as_secs() >= self.config.retention_interval_secs,
        }
    }
}
