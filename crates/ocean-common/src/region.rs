//! Ocean region classification derived from NDBC station identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse geographic bucket for a station.
///
/// NDBC assigns station identifiers with a two-digit prefix that encodes
/// the deployment basin; the mapping below follows that convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Atlantic,
    Gulf,
    Pacific,
    GreatLakes,
    /// Catch-all for prefixes outside the mapped basins.
    Other,
}

/// Station-ID prefix to region mapping.
///
/// 41/44 Western and Northeast US Atlantic, 42 Gulf of Mexico,
/// 45 Great Lakes, 46 Northeast Pacific, 51/52 Hawaii and Pacific Islands.
const REGION_PREFIXES: &[(&str, Region)] = &[
    ("41", Region::Atlantic),
    ("42", Region::Gulf),
    ("44", Region::Atlantic),
    ("45", Region::GreatLakes),
    ("46", Region::Pacific),
    ("51", Region::Pacific),
    ("52", Region::Pacific),
];

impl Region {
    /// Classify a station identifier by its two-digit prefix.
    ///
    /// Unknown prefixes map to [`Region::Other`]; this never fails.
    pub fn from_station_id(station_id: &str) -> Self {
        REGION_PREFIXES
            .iter()
            .find(|(prefix, _)| station_id.starts_with(prefix))
            .map(|(_, region)| *region)
            .unwrap_or(Region::Other)
    }

    /// Stable text form used in the database and API payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Atlantic => "atlantic",
            Region::Gulf => "gulf",
            Region::Pacific => "pacific",
            Region::GreatLakes => "great_lakes",
            Region::Other => "other",
        }
    }

    /// Parse the stored text form back into a region.
    ///
    /// Unrecognized values fall back to [`Region::Other`] so a widened
    /// upstream mapping never breaks reads of older rows.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "atlantic" => Region::Atlantic,
            "gulf" => Region::Gulf,
            "pacific" => Region::Pacific,
            "great_lakes" => Region::GreatLakes,
            _ => Region::Other,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
