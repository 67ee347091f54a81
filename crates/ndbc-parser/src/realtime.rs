//! Parser for per-station realtime history files.
//!
//! `realtime2/{ID}.txt` holds roughly 45 days of observations for one
//! station, newest first, with the timestamp leading each row:
//!
//! ```text
//! #YY  MM DD hh mm WDIR WSPD GST  WVHT   DPD   APD MWD   PRES  ATMP  WTMP  DEWP  VIS PTDY  TIDE
//! 2025 06 01 11 50  190  6.0 8.0   1.5   7.0   5.2 185 1015.2  22.1  23.8  19.5   MM   MM    MM
//! ```
//!
//! The station identifier is not in the rows; the caller supplies it
//! from the URL it fetched.

use tracing::debug;

use ocean_common::Measurement;

use crate::latest_obs::parse_timestamp;
use crate::normalize::parse_reading;

const COL_YEAR: usize = 0;
const COL_MONTH: usize = 1;
const COL_DAY: usize = 2;
const COL_HOUR: usize = 3;
const COL_MINUTE: usize = 4;
const COL_WDIR: usize = 5;
const COL_WSPD: usize = 6;
const COL_GST: usize = 7;
const COL_WVHT: usize = 8;
const COL_DPD: usize = 9;
const COL_MWD: usize = 11;
const COL_PRES: usize = 12;
const COL_ATMP: usize = 13;
const COL_WTMP: usize = 14;
const COL_DEWP: usize = 15;
const COL_VIS: usize = 16;

/// Rows end with PTDY and TIDE, both frequently absent.
const MIN_FIELDS: usize = 17;

/// Parse a station's realtime history file into measurement records.
pub fn parse_realtime(station_id: &str, text: &str) -> Vec<Measurement> {
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

        let observed_at = match parse_timestamp(
            parts[COL_YEAR],
            parts[COL_MONTH],
            parts[COL_DAY],
            parts[COL_HOUR],
            parts[COL_MINUTE],
        ) {
            Some(at) => at,
            None => continue,
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
        m.visibility = parse_reading(parts[COL_VIS]);
        measurements.push(m);
    }

    debug!(station = %station_id, count = measurements.len(), "parsed realtime history");
    measurements
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const SAMPLE: &str = "\
#YY  MM DD hh mm WDIR WSPD GST  WVHT   DPD   APD MWD   PRES  ATMP  WTMP  DEWP  VIS PTDY  TIDE
#yr  mo dy hr mn degT m/s  m/s     m   sec   sec degT   hPa  degC  degC  degC  nmi  hPa    ft
2025 06 01 11 50  190  6.0 8.0   1.5   7.0   5.2 185 1015.2  22.1  23.8  19.5   MM   MM    MM
2025 06 01 10 50  200  5.5 7.0   1.4   7.0   5.0 180 1015.8  21.9  23.8  19.2   MM +1.2    MM";

    #[test]
    fn test_parses_history_rows_with_supplied_station_id() {
        let ms = parse_realtime("41001", SAMPLE);

        assert_eq!(ms.len(), 2);
        assert!(ms.iter().all(|m| m.station_id == "41001"));
        assert_eq!(
            ms[0].observed_at,
            Utc.with_ymd_and_hms(2025, 6, 1, 11, 50, 0).unwrap()
        );
        assert_eq!(ms[1].pressure, Some(1015.8));
        // MWD column, two past DPD
        assert_eq!(ms[0].wave_direction, Some(185.0));
    }

    #[test]
    fn test_both_header_lines_are_skipped() {
        let ms = parse_realtime("41001", SAMPLE);
        assert_eq!(ms.len(), 2);
    }

    #[test]
    fn test_short_row_is_skipped() {
        let text = "2025 06 01 11 50 190 6.0 8.0 1.5";
        assert!(parse_realtime("41001", text).is_empty());
    }

    #[test]
    fn test_sentinels_normalize_in_history_rows() {
        let text =
            "2025 06 01 09 50 999 99.0 99.0 99.0 99.0 99.0 999 9999.0 999.0 999.0 999.0 99.0 MM MM";
        let ms = parse_realtime("42001", text);

        assert_eq!(ms.len(), 1);
        let m = &ms[0];
        assert!(m.wind_direction.is_none());
        assert!(m.wind_speed.is_none());
        assert!(m.wave_height.is_none());
        assert!(m.pressure.is_none());
        assert!(m.water_temp.is_none());
        assert!(m.visibility.is_none());
    }

    #[test]
    fn test_malformed_date_skips_row() {
        let text = "2025 02 30 11 50 190 6.0 8.0 1.5 7.0 5.2 185 1015.2 22.1 23.8 19.5 MM MM MM";
        assert!(parse_realtime("41001", text).is_empty());
    }
}
