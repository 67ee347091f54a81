//! Parsers for NOAA NDBC plain-text feeds.
//!
//! NDBC publishes buoy data as unauthenticated text files whose column
//! layout is a compatibility contract. This crate turns the three feeds
//! into typed records:
//!
//! - `station_table.txt`: pipe-delimited station metadata
//! - `latest_obs.txt`: whitespace-delimited latest observation per station
//! - `realtime2/{ID}.txt`: ~45 days of history for a single station
//!
//! Parsing is tolerant: a malformed row is dropped and the rest of the
//! feed still parses. Only the caller's fetch can fail a run.

pub mod latest_obs;
pub mod normalize;
pub mod realtime;
pub mod station_table;

pub use latest_obs::parse_latest_obs;
pub use normalize::{is_station_id, parse_coordinate, parse_reading};
pub use realtime::parse_realtime;
pub use station_table::parse_station_table;
