//! Parser for the NDBC latest-observations feed.
//!
//! `latest_obs.txt` carries the most recent observation from every
//! active station, whitespace-delimited in a fixed column order:
//!
//! ```text
//! #STN  LAT    LON   YYYY MM DD hh mm WDIR WSPD GST WVHT  DPD  APD MWD  PRES  ATMP  WTMP  DEWP VIS TIDE
//! 41001 34.7  -72.7  2025 06 01 11 50 190  6.0  8.0  1.5  7.0  5.2 185 1015.2 22.1  23.8  19.5  MM   MM
//! ```

use chrono::{TimeZone, Utc};
use tracing::{debug, trace};

use ocean_common::Measurement;

use crate::normalize::{is_station_id, parse_reading};

// Column positions in latest_obs.txt. LAT/LON (1, 2) are carried by the
// station table instead and APD (13) is not stored.
const COL_STATION: usize = 0;
const COL_YEAR: usize = 3;
const COL_MONTH: usize = 4;
const COL_DAY: usize = 5;
const COL_HOUR: usize = 6;
const COL_MINUTE: usize = 7;
const COL_WDIR: usize = 8;
const COL_WSPD: usize = 9;
const COL_GST: usize = 10;
const COL_WVHT: usize = 11;
const COL_DPD: usize = 12;
const COL_MWD: usize = 14;
const COL_PRES: usize = 15;
const COL_ATMP: usize = 16;
const COL_WTMP: usize = 17;
const COL_DEWP: usize = 18;
const COL_VIS: usize = 19;

/// Rows shorter than this are misaligned and skipped. VIS and TIDE are
/// frequently absent, so the threshold stops after DEWP.
const MIN_FIELDS: usize = 19;

/// Parse the latest-observations feed into measurement records.
///
/// Per-row failures (wrong column count, non-buoy identifier, invalid
/// date components) skip that row only.
pub fn parse_latest_obs(text: &str) -> Vec<Measurement> {
    let mut measurements = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < MIN_FIELDS {
            continue;
        }

        let station_id = parts[COL_STATION];
        if !is_station_id(station_id) {
            trace!(token = %station_id, "skipping non-buoy identifier");
            continue;
        }

        let observed_at = match parse_timestamp(
            parts[COL_YEAR],
            parts[COL_MONTH],
            parts[COL_DAY],
            parts[COL_HOUR],
            parts[COL_MINUTE],
        ) {
            Some(at) => at,
            None => {
                debug!(station = %station_id, "skipping row with malformed timestamp");
                continue;
            }
        };

        let mut m = Measurement::empty(station_id, observed_at);
        m.wind_direction = parse_reading(parts[COL_WDIR]);
        m.wind_speed = parse_reading(parts[COL_WSPD]);
        m.wind_gust = parse_reading(parts[COL_GST]);
        m.wave_height = parse_reading(parts[COL_WVHT]);
        m.dominant_period = parse_reading(parts[COL_DPD]);
        m.wave_direction = parse_reading(parts[COL_MWD]);
        m.pressure = parse_reading(parts[COL_PRES]);
        m.air_temp = parse_reading(parts[COL_ATMP]);
        m.water_temp = parse_reading(parts[COL_WTMP]);
        m.dewpoint = parse_reading(parts[COL_DEWP]);
        m.visibility = parts.get(COL_VIS).and_then(|v| parse_reading(v));
        measurements.push(m);
    }

    debug!(count = measurements.len(), "parsed latest observations");
    measurements
}

/// Combine the feed's split date fields into a UTC instant.
pub(crate) fn parse_timestamp(
    year: &str,
    month: &str,
    day: &str,
    hour: &str,
    minute: &str,
) -> Option<chrono::DateTime<Utc>> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;

    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str =
        "41001 34.7  -72.7 2025 06 01 11 50 190  6.0  8.0  1.5  7.0  5.2 185 1015.2 22.1 23.8 19.5 MM MM";

    #[test]
    fn test_well_formed_row() {
        let ms = parse_latest_obs(WELL_FORMED);
        assert_eq!(ms.len(), 1);

        let m = &ms[0];
        assert_eq!(m.station_id, "41001");
        assert_eq!(
            m.observed_at,
            Utc.with_ymd_and_hms(2025, 6, 1, 11, 50, 0).unwrap()
        );
        assert_eq!(m.wind_direction, Some(190.0));
        assert_eq!(m.wind_speed, Some(6.0));
        assert_eq!(m.wind_gust, Some(8.0));
        assert_eq!(m.wave_height, Some(1.5));
        assert_eq!(m.dominant_period, Some(7.0));
        // MWD, not APD
        assert_eq!(m.wave_direction, Some(185.0));
        assert_eq!(m.pressure, Some(1015.2));
        assert_eq!(m.air_temp, Some(22.1));
        assert_eq!(m.water_temp, Some(23.8));
        assert_eq!(m.dewpoint, Some(19.5));
        assert_eq!(m.visibility, None);
    }

    #[test]
    fn test_sentinel_wind_speed_is_absent_not_zero() {
        let text =
            "42001 25.9  -89.7 2025 06 01 12 00 MM  99.0 MM   2.0  6.0  5.0 170 1013.0 25.0 27.0 MM MM MM";
        let ms = parse_latest_obs(text);

        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].wind_speed, None);
        assert_eq!(ms[0].wind_direction, None);
        assert_eq!(ms[0].wind_gust, None);
        assert_eq!(ms[0].dewpoint, None);
        assert_eq!(ms[0].wave_height, Some(2.0));
    }

    #[test]
    fn test_comment_lines_are_skipped() {
        let text = format!(
            "#STN LAT LON YYYY MM DD hh mm WDIR WSPD GST WVHT DPD APD MWD PRES ATMP WTMP DEWP VIS TIDE\n{}",
            WELL_FORMED
        );
        assert_eq!(parse_latest_obs(&text).len(), 1);
    }

    #[test]
    fn test_malformed_date_skips_only_that_row() {
        let bad = "41002 32.3  -75.4 2025 13 01 11 50 190 6.0 8.0 1.5 7.0 5.2 185 1015.2 22.1 23.8 19.5 MM MM";
        let text = format!("{}\n{}", bad, WELL_FORMED);
        let ms = parse_latest_obs(&text);

        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].station_id, "41001");
    }

    #[test]
    fn test_short_row_skips_only_that_row() {
        let short = "41002 32.3 -75.4 2025 06 01 11 50 190 6.0";
        let text = format!("{}\n{}", short, WELL_FORMED);
        assert_eq!(parse_latest_obs(&text).len(), 1);
    }

    #[test]
    fn test_non_buoy_identifier_is_dropped() {
        let text =
            "BUZM3 41.4 -71.0 2025 06 01 11 50 190 6.0 8.0 1.5 7.0 5.2 185 1015.2 22.1 23.8 19.5 MM MM";
        assert!(parse_latest_obs(text).is_empty());
    }

    #[test]
    fn test_row_without_visibility_column() {
        // Exactly MIN_FIELDS columns: ends at DEWP.
        let text = "46042 36.8 -122.4 2025 06 01 10 40 300 4.0 5.0 2.1 9.0 6.8 290 1017.8 14.2 13.1 11.0";
        let ms = parse_latest_obs(text);

        assert_eq!(ms.len(), 1);
        assert_eq!(ms[0].dewpoint, Some(11.0));
        assert_eq!(ms[0].visibility, None);
    }

    #[test]
    fn test_timestamp_is_utc_midnight_boundary() {
        let text =
            "51001 23.4 -162.3 2025 01 01 00 00 MM MM MM 3.0 11.0 8.0 320 1018.0 24.0 25.0 MM MM MM";
        let ms = parse_latest_obs(text);
        assert_eq!(
            ms[0].observed_at,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );
    }
}
