//! Write side of the store: schema, batched upserts, run log, retention.

use chrono::{Duration, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info, warn};

use ocean_common::{Measurement, OceanError, OceanResult, Station};

/// Stations are upserted in batches of this size.
pub const STATION_BATCH_SIZE: usize = 200;

/// Measurements are inserted in batches of this size.
pub const MEASUREMENT_BATCH_SIZE: usize = 500;

/// Run-log error messages are truncated to this many characters.
const MAX_ERROR_LEN: usize = 500;

/// Database connection pool and persistence operations.
#[derive(Clone)]
pub struct Store {
    pub(crate) pool: PgPool,
}

impl Store {
    /// Create a new store from a database URL.
    pub async fn connect(database_url: &str) -> OceanResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| OceanError::DatabaseError(format!("Connection failed: {}", e)))?;

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> OceanResult<()> {
        // Split SQL statements and execute them individually
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| OceanError::DatabaseError(format!("Migration failed: {}", e)))?;
            }
        }

        Ok(())
    }

    /// Upsert station records in bounded batches.
    ///
    /// Identical input on a repeat run is a no-op beyond `updated_at`;
    /// changed fields are overwritten. A failed batch is logged and
    /// skipped so the remaining batches still land. Returns the number
    /// of rows written.
    pub async fn upsert_stations(&self, stations: &[Station]) -> OceanResult<u64> {
        let mut written = 0u64;

        for batch in stations.chunks(STATION_BATCH_SIZE) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO stations (id, name, latitude, longitude, region, station_type, is_active) ",
            );
            qb.push_values(batch, |mut b, s| {
                b.push_bind(&s.id)
                    .push_bind(&s.name)
                    .push_bind(s.latitude)
                    .push_bind(s.longitude)
                    .push_bind(s.region.as_str())
                    .push_bind(&s.station_type)
                    .push_bind(s.is_active);
            });
            qb.push(
                " ON CONFLICT (id) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 latitude = EXCLUDED.latitude, \
                 longitude = EXCLUDED.longitude, \
                 region = EXCLUDED.region, \
                 station_type = EXCLUDED.station_type, \
                 is_active = EXCLUDED.is_active, \
                 updated_at = NOW()",
            );

            match qb.build().execute(&self.pool).await {
                Ok(result) => written += result.rows_affected(),
                Err(e) => {
                    warn!(batch_size = batch.len(), error = %e, "Station batch upsert failed, skipping batch");
                }
            }
        }

        debug!(written, total = stations.len(), "Upserted stations");
        Ok(written)
    }

    /// Insert measurement records in bounded batches.
    ///
    /// The natural key `(station_id, observed_at)` makes re-ingestion a
    /// no-op: existing rows are left untouched. A batch that fails as a
    /// whole (e.g. one row referencing an unknown station) is retried
    /// row by row so the valid rows still land. Returns the number of
    /// genuinely new rows.
    pub async fn insert_measurements(&self, measurements: &[Measurement]) -> OceanResult<u64> {
        let mut written = 0u64;

        for batch in measurements.chunks(MEASUREMENT_BATCH_SIZE) {
            let mut qb = Self::measurement_insert(batch);

            match qb.build().execute(&self.pool).await {
                Ok(result) => written += result.rows_affected(),
                Err(e) => {
                    warn!(batch_size = batch.len(), error = %e, "Measurement batch failed, retrying rows individually");
                    for m in batch {
                        match self.insert_measurement_row(m).await {
                            Ok(n) => written += n,
                            Err(e) => {
                                debug!(station = %m.station_id, error = %e, "Skipping measurement row");
                            }
                        }
                    }
                }
            }
        }

        debug!(written, total = measurements.len(), "Inserted measurements");
        Ok(written)
    }

    fn measurement_insert(batch: &[Measurement]) -> QueryBuilder<'_, Postgres> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO measurements (\
             station_id, observed_at, wind_direction, wind_speed, wind_gust, \
             wave_height, dominant_period, wave_direction, pressure, \
             air_temp, water_temp, dewpoint, visibility) ",
        );
        qb.push_values(batch, |mut b, m| {
            b.push_bind(&m.station_id)
                .push_bind(m.observed_at)
                .push_bind(m.wind_direction)
                .push_bind(m.wind_speed)
                .push_bind(m.wind_gust)
                .push_bind(m.wave_height)
                .push_bind(m.dominant_period)
                .push_bind(m.wave_direction)
                .push_bind(m.pressure)
                .push_bind(m.air_temp)
                .push_bind(m.water_temp)
                .push_bind(m.dewpoint)
                .push_bind(m.visibility);
        });
        qb.push(" ON CONFLICT (station_id, observed_at) DO NOTHING");
        qb
    }

    async fn insert_measurement_row(&self, m: &Measurement) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO measurements (\
             station_id, observed_at, wind_direction, wind_speed, wind_gust, \
             wave_height, dominant_period, wave_direction, pressure, \
             air_temp, water_temp, dewpoint, visibility) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (station_id, observed_at) DO NOTHING",
        )
        .bind(&m.station_id)
        .bind(m.observed_at)
        .bind(m.wind_direction)
        .bind(m.wind_speed)
        .bind(m.wind_gust)
        .bind(m.wave_height)
        .bind(m.dominant_period)
        .bind(m.wave_direction)
        .bind(m.pressure)
        .bind(m.air_temp)
        .bind(m.water_temp)
        .bind(m.dewpoint)
        .bind(m.visibility)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Record the start of an ingestion run. Returns the run id.
    pub async fn start_run(&self) -> OceanResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO ingestion_runs (status) VALUES ('running') RETURNING id",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| OceanError::DatabaseError(format!("Run insert failed: {}", e)))?;

        Ok(id)
    }

    /// Mark a run as successfully completed with its final counts.
    pub async fn finish_run(
        &self,
        run_id: i64,
        stations_count: u64,
        measurements_count: u64,
    ) -> OceanResult<()> {
        sqlx::query(
            "UPDATE ingestion_runs SET \
             finished_at = NOW(), status = 'success', \
             stations_count = $2, measurements_count = $3 \
             WHERE id = $1",
        )
        .bind(run_id)
        .bind(stations_count as i64)
        .bind(measurements_count as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| OceanError::DatabaseError(format!("Run update failed: {}", e)))?;

        Ok(())
    }

    /// Mark a run as failed, keeping a truncated error detail.
    pub async fn fail_run(&self, run_id: i64, error_message: &str) -> OceanResult<()> {
        let detail: String = error_message.chars().take(MAX_ERROR_LEN).collect();

        sqlx::query(
            "UPDATE ingestion_runs SET \
             finished_at = NOW(), status = 'error', error_message = $2 \
             WHERE id = $1",
        )
        .bind(run_id)
        .bind(detail)
        .execute(&self.pool)
        .await
        .map_err(|e| OceanError::DatabaseError(format!("Run update failed: {}", e)))?;

        Ok(())
    }

    /// Delete measurements older than the retention window.
    ///
    /// Independent of ingestion; meant to run on its own schedule.
    /// Returns the number of rows deleted.
    pub async fn prune_measurements(&self, older_than_days: u32) -> OceanResult<u64> {
        let cutoff = Utc::now() - Duration::days(older_than_days as i64);

        let result = sqlx::query("DELETE FROM measurements WHERE observed_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| OceanError::DatabaseError(format!("Retention sweep failed: {}", e)))?;

        let deleted = result.rows_affected();
        if deleted > 0 {
            info!(deleted, older_than_days, "Pruned old measurements");
        }
        Ok(deleted)
    }
}

/// Database schema SQL.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS stations (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    latitude DOUBLE PRECISION NOT NULL,
    longitude DOUBLE PRECISION NOT NULL,
    region TEXT NOT NULL,
    station_type TEXT NOT NULL DEFAULT 'buoy',
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_stations_region ON stations(region);
CREATE INDEX IF NOT EXISTS idx_stations_location ON stations(latitude, longitude);

CREATE TABLE IF NOT EXISTS measurements (
    station_id TEXT NOT NULL REFERENCES stations(id),
    observed_at TIMESTAMPTZ NOT NULL,
    wind_direction DOUBLE PRECISION,
    wind_speed DOUBLE PRECISION,
    wind_gust DOUBLE PRECISION,
    wave_height DOUBLE PRECISION,
    dominant_period DOUBLE PRECISION,
    wave_direction DOUBLE PRECISION,
    pressure DOUBLE PRECISION,
    air_temp DOUBLE PRECISION,
    water_temp DOUBLE PRECISION,
    dewpoint DOUBLE PRECISION,
    visibility DOUBLE PRECISION,

    PRIMARY KEY (station_id, observed_at)
);

CREATE INDEX IF NOT EXISTS idx_measurements_observed_at ON measurements(observed_at DESC);

CREATE TABLE IF NOT EXISTS ingestion_runs (
    id BIGSERIAL PRIMARY KEY,
    started_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    finished_at TIMESTAMPTZ,
    status TEXT NOT NULL DEFAULT 'running',
    stations_count BIGINT NOT NULL DEFAULT 0,
    measurements_count BIGINT NOT NULL DEFAULT 0,
    error_message TEXT
);

CREATE INDEX IF NOT EXISTS idx_ingestion_runs_started_at ON ingestion_runs(started_at DESC);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_enforces_natural_keys() {
        // The measurement uniqueness and station upsert targets both
        // hinge on these constraints being present in the schema.
        assert!(SCHEMA_SQL.contains("PRIMARY KEY (station_id, observed_at)"));
        assert!(SCHEMA_SQL.contains("id TEXT PRIMARY KEY"));
        assert!(SCHEMA_SQL.contains("REFERENCES stations(id)"));
    }

    #[test]
    fn test_schema_splits_into_executable_statements() {
        let statements: Vec<&str> = SCHEMA_SQL
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        assert!(statements.len() >= 6);
        for stmt in statements {
            assert!(stmt.to_uppercase().starts_with("CREATE"));
        }
    }

    #[test]
    fn test_batch_sizes_are_bounded() {
        assert!(STATION_BATCH_SIZE <= 200);
        assert!(MEASUREMENT_BATCH_SIZE <= 500);
    }
}
