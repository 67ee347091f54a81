//! Read-side query functions.
//!
//! These four operations are the contract the dashboard layer depends
//! on. All are side-effect-free and safe for concurrent callers; none
//! of them blocks on or interferes with an in-flight ingestion run.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;
use tracing::debug;

use ocean_common::{
    BoundingBox, IngestionRun, Measurement, OceanError, OceanResult, Region, RunStatus,
};

use crate::store::Store;

/// A station joined to its most recent measurement.
///
/// Measurement columns are `None` both for a station that has never
/// reported and for a reading its sensors did not include; consumers
/// rely on "no data" staying distinct from zero.
#[derive(Debug, Clone, Serialize)]
pub struct StationWithLatest {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub region: Region,
    pub station_type: String,
    pub is_active: bool,
    pub observed_at: Option<DateTime<Utc>>,
    pub wind_direction: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    pub wave_height: Option<f64>,
    pub dominant_period: Option<f64>,
    pub wave_direction: Option<f64>,
    pub pressure: Option<f64>,
    pub air_temp: Option<f64>,
    pub water_temp: Option<f64>,
    pub dewpoint: Option<f64>,
    pub visibility: Option<f64>,
}

/// Operational snapshot for dashboards: the most recent run plus
/// aggregate store counts.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStatus {
    pub last_run: Option<IngestionRun>,
    pub active_stations: i64,
    pub total_measurements: i64,
    pub oldest_measurement: Option<DateTime<Utc>>,
    pub newest_measurement: Option<DateTime<Utc>>,
}

const STATION_WITH_LATEST_SELECT: &str =
    "SELECT s.id, s.name, s.latitude, s.longitude, s.region, s.station_type, s.is_active, \
     m.observed_at, m.wind_direction, m.wind_speed, m.wind_gust, m.wave_height, \
     m.dominant_period, m.wave_direction, m.pressure, m.air_temp, m.water_temp, \
     m.dewpoint, m.visibility \
     FROM stations s \
     LEFT JOIN LATERAL ( \
         SELECT * FROM measurements \
         WHERE station_id = s.id \
         ORDER BY observed_at DESC LIMIT 1 \
     ) m ON TRUE \
     WHERE s.is_active";

impl Store {
    /// Every active station with its most recent measurement.
    ///
    /// Stations that have not reported yet still appear, with all
    /// measurement columns null. Ordered by region, then name.
    pub async fn stations_with_latest(&self) -> OceanResult<Vec<StationWithLatest>> {
        let sql = format!("{} ORDER BY s.region, s.name", STATION_WITH_LATEST_SELECT);

        let rows = sqlx::query_as::<_, StationLatestRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| OceanError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Measurements for one station within the lookback window, oldest
    /// first. The window boundary is inclusive; an unknown station
    /// yields an empty series.
    pub async fn station_series(
        &self,
        station_id: &str,
        window_hours: u32,
    ) -> OceanResult<Vec<Measurement>> {
        let cutoff = Utc::now() - Duration::hours(window_hours as i64);

        let rows = sqlx::query_as::<_, MeasurementRow>(
            "SELECT station_id, observed_at, wind_direction, wind_speed, wind_gust, \
             wave_height, dominant_period, wave_direction, pressure, \
             air_temp, water_temp, dewpoint, visibility \
             FROM measurements \
             WHERE station_id = $1 AND observed_at >= $2 \
             ORDER BY observed_at ASC",
        )
        .bind(station_id)
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| OceanError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// Active stations inside a bounding box, each with its latest
    /// measurement, ordered by name. Bounds are inclusive; an inverted
    /// box yields an empty result.
    pub async fn stations_in_bbox(&self, bbox: &BoundingBox) -> OceanResult<Vec<StationWithLatest>> {
        if bbox.is_empty() {
            debug!(?bbox, "Inverted bounding box, returning empty result");
            return Ok(Vec::new());
        }

        let sql = format!(
            "{} AND s.latitude >= $1 AND s.latitude <= $2 \
             AND s.longitude >= $3 AND s.longitude <= $4 \
             ORDER BY s.name",
            STATION_WITH_LATEST_SELECT
        );

        let rows = sqlx::query_as::<_, StationLatestRow>(&sql)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| OceanError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    /// The most recent run record plus aggregate store counts.
    pub async fn pipeline_status(&self) -> OceanResult<PipelineStatus> {
        let last_run = sqlx::query_as::<_, RunRow>(
            "SELECT id, started_at, finished_at, status, stations_count, \
             measurements_count, error_message \
             FROM ingestion_runs ORDER BY started_at DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| OceanError::DatabaseError(format!("Query failed: {}", e)))?;

        let active_stations = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM stations WHERE is_active",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| OceanError::DatabaseError(format!("Query failed: {}", e)))?;

        let (total_measurements, oldest_measurement, newest_measurement) =
            sqlx::query_as::<_, (i64, Option<DateTime<Utc>>, Option<DateTime<Utc>>)>(
                "SELECT COUNT(*), MIN(observed_at), MAX(observed_at) FROM measurements",
            )
            .fetch_one(&self.pool)
            .await
            .map_err(|e| OceanError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(PipelineStatus {
            last_run: last_run.map(|r| r.into()),
            active_stations,
            total_measurements,
            oldest_measurement,
            newest_measurement,
        })
    }
}

/// Internal row type for the station + latest-measurement join.
#[derive(FromRow)]
struct StationLatestRow {
    id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    region: String,
    station_type: String,
    is_active: bool,
    observed_at: Option<DateTime<Utc>>,
    wind_direction: Option<f64>,
    wind_speed: Option<f64>,
    wind_gust: Option<f64>,
    wave_height: Option<f64>,
    dominant_period: Option<f64>,
    wave_direction: Option<f64>,
    pressure: Option<f64>,
    air_temp: Option<f64>,
    water_temp: Option<f64>,
    dewpoint: Option<f64>,
    visibility: Option<f64>,
}

impl From<StationLatestRow> for StationWithLatest {
    fn from(row: StationLatestRow) -> Self {
        StationWithLatest {
            id: row.id,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            region: Region::from_str_lossy(&row.region),
            station_type: row.station_type,
            is_active: row.is_active,
            observed_at: row.observed_at,
            wind_direction: row.wind_direction,
            wind_speed: row.wind_speed,
            wind_gust: row.wind_gust,
            wave_height: row.wave_height,
            dominant_period: row.dominant_period,
            wave_direction: row.wave_direction,
            pressure: row.pressure,
            air_temp: row.air_temp,
            water_temp: row.water_temp,
            dewpoint: row.dewpoint,
            visibility: row.visibility,
        }
    }
}

/// Internal row type for measurement queries.
#[derive(FromRow)]
struct MeasurementRow {
    station_id: String,
    observed_at: DateTime<Utc>,
    wind_direction: Option<f64>,
    wind_speed: Option<f64>,
    wind_gust: Option<f64>,
    wave_height: Option<f64>,
    dominant_period: Option<f64>,
    wave_direction: Option<f64>,
    pressure: Option<f64>,
    air_temp: Option<f64>,
    water_temp: Option<f64>,
    dewpoint: Option<f64>,
    visibility: Option<f64>,
}

impl From<MeasurementRow> for Measurement {
    fn from(row: MeasurementRow) -> Self {
        Measurement {
            station_id: row.station_id,
            observed_at: row.observed_at,
            wind_direction: row.wind_direction,
            wind_speed: row.wind_speed,
            wind_gust: row.wind_gust,
            wave_height: row.wave_height,
            dominant_period: row.dominant_period,
            wave_direction: row.wave_direction,
            pressure: row.pressure,
            air_temp: row.air_temp,
            water_temp: row.water_temp,
            dewpoint: row.dewpoint,
            visibility: row.visibility,
        }
    }
}

/// Internal row type for run-log queries.
#[derive(FromRow)]
struct RunRow {
    id: i64,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    status: String,
    stations_count: i64,
    measurements_count: i64,
    error_message: Option<String>,
}

impl From<RunRow> for IngestionRun {
    fn from(row: RunRow) -> Self {
        IngestionRun {
            id: row.id,
            started_at: row.started_at,
            finished_at: row.finished_at,
            status: RunStatus::from_str_lossy(&row.status),
            stations_count: row.stations_count,
            measurements_count: row.measurements_count,
            error_message: row.error_message,
        }
    }
}
