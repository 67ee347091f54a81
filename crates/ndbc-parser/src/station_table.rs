//! Parser for the NDBC station table feed.
//!
//! `station_table.txt` is pipe-delimited, one station per line:
//!
//! ```text
//! # STATION_ID | OWNER | TTYPE | HULL | NAME | PAYLOAD | LOCATION | ...
//! 41001 | LLNR 815 - 150 NM East of Cape HATTERAS | 34.700 N | 72.700 W | ...
//! ```

use tracing::{debug, trace};

use ocean_common::{Region, Station};

use crate::normalize::{is_station_id, parse_coordinate};

/// Display names longer than this are truncated before persistence.
const MAX_NAME_LEN: usize = 200;

/// Parse the station table feed into station records.
///
/// Tolerant of the feed's mixed content: comment and separator lines,
/// header rows, non-buoy identifiers, and rows with unparsable
/// coordinates are all dropped without failing the batch.
pub fn parse_station_table(text: &str) -> Vec<Station> {
    let mut stations = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("|--") {
            continue;
        }

        let parts: Vec<&str> = line
            .split('|')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        if parts.len() < 4 {
            continue;
        }

        let id = parts[0];
        if id.eq_ignore_ascii_case("station") || id.eq_ignore_ascii_case("stn") {
            continue;
        }
        if !is_station_id(id) {
            trace!(token = %id, "skipping non-buoy identifier");
            continue;
        }

        let (latitude, longitude) = match (parse_coordinate(parts[2]), parse_coordinate(parts[3])) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                debug!(station = %id, "skipping row with unparsable coordinates");
                continue;
            }
        };
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            debug!(station = %id, latitude, longitude, "skipping row with out-of-range coordinates");
            continue;
        }

        stations.push(Station {
            id: id.to_string(),
            name: truncate_name(parts[1]),
            latitude,
            longitude,
            region: Region::from_station_id(id),
            station_type: "buoy".to_string(),
            is_active: true,
        });
    }

    debug!(count = stations.len(), "parsed station table");
    stations
}

fn truncate_name(name: &str) -> String {
    name.chars().take(MAX_NAME_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_buoy_line() {
        let text = "41001 | LLNR 815 - 150 NM East of Cape HATTERAS | 34.700 N | 72.700 W | ARES payload";
        let stations = parse_station_table(text);

        assert_eq!(stations.len(), 1);
        let s = &stations[0];
        assert_eq!(s.id, "41001");
        assert_eq!(s.name, "LLNR 815 - 150 NM East of Cape HATTERAS");
        assert_eq!(s.latitude, 34.7);
        assert_eq!(s.longitude, -72.7);
        assert_eq!(s.region, Region::Atlantic);
        assert_eq!(s.station_type, "buoy");
        assert!(s.is_active);
    }

    #[test]
    fn test_comment_separator_and_header_lines_are_skipped() {
        let text = "\
# NDBC station table
|---|---|---|---|
STATION | NAME | LAT | LON
stn | name | lat | lon
41001 | East Hatteras | 34.700 N | 72.700 W | x";
        assert_eq!(parse_station_table(text).len(), 1);
    }

    #[test]
    fn test_non_numeric_identifiers_are_dropped() {
        let text = "\
BUZM3 | Buzzards Bay | 41.397 N | 71.033 W | x
SHIP | Ship report | 30.0 N | 60.0 W | x
44013 | Boston | 42.346 N | 70.651 W | x";
        let stations = parse_station_table(text);

        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, "44013");
    }

    #[test]
    fn test_unparsable_coordinates_drop_row_not_batch() {
        let text = "\
41001 | East Hatteras | garbage | 72.700 W | x
42001 | Mid Gulf | 25.897 N | 89.668 W | x";
        let stations = parse_station_table(text);

        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].id, "42001");
        assert_eq!(stations[0].region, Region::Gulf);
    }

    #[test]
    fn test_out_of_range_coordinates_drop_row() {
        let text = "41001 | Bad | 134.700 N | 72.700 W | x";
        assert!(parse_station_table(text).is_empty());
    }

    #[test]
    fn test_too_few_fields_drops_row() {
        let text = "41001 | only name | 34.700 N";
        assert!(parse_station_table(text).is_empty());
    }

    #[test]
    fn test_long_name_is_truncated() {
        let long_name = "x".repeat(300);
        let text = format!("41001 | {} | 34.700 N | 72.700 W | x", long_name);
        let stations = parse_station_table(&text);

        assert_eq!(stations[0].name.chars().count(), MAX_NAME_LEN);
    }

    #[test]
    fn test_unknown_prefix_classifies_as_other() {
        let text = "32301 | Peru offshore | 9.900 S | 105.200 W | x";
        let stations = parse_station_table(text);

        assert_eq!(stations[0].region, Region::Other);
        assert_eq!(stations[0].latitude, -9.9);
    }
}
