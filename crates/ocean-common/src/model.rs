//! Domain records produced by the parsers and persisted by storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::region::Region;

/// A fixed sensor platform identified by its NDBC station code.
///
/// Stations are upsert targets: every ingestion run overwrites the
/// mutable fields for codes it sees again. The pipeline never deletes
/// a station; decommissioning flips `is_active` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// 5-digit NDBC station code.
    pub id: String,
    pub name: String,
    /// WGS84 latitude, south negative.
    pub latitude: f64,
    /// WGS84 longitude, west negative.
    pub longitude: f64,
    pub region: Region,
    pub station_type: String,
    pub is_active: bool,
}

/// One observation snapshot for one station at one instant.
///
/// Every reading is independently optional: a sensor that did not
/// report a variable yields `None`, never zero. The pair
/// `(station_id, observed_at)` is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub station_id: String,
    /// Observation time, always UTC.
    pub observed_at: DateTime<Utc>,
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

impl Measurement {
    /// A measurement with every reading absent, for rows where only
    /// the timestamp parsed.
    pub fn empty(station_id: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            station_id: station_id.into(),
            observed_at,
            wind_direction: None,
            wind_speed: None,
            wind_gust: None,
            wave_height: None,
            dominant_period: None,
            wave_direction: None,
            pressure: None,
            air_temp: None,
            water_temp: None,
            dewpoint: None,
            visibility: None,
        }
    }
}

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Success,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Error => "error",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "running" => RunStatus::Running,
            "success" => RunStatus::Success,
            _ => RunStatus::Error,
        }
    }
}

/// Audit-log row for one execution of the ingestion pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionRun {
    pub id: i64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub stations_count: i64,
    pub measurements_count: i64,
    pub error_message: Option<String>,
}
