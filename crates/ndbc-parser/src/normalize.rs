//! Normalization rules shared by the feed parsers.

/// Token NDBC prints for a reading the sensor did not report.
const MISSING_TOKEN: &str = "MM";

/// Numeric magnitudes NDBC uses as missing-value markers, varying by
/// field width. The upstream format documentation is the authority;
/// this list mirrors the currently documented conventions.
const SENTINEL_MAGNITUDES: &[f64] = &[99.0, 999.0, 9999.0];

/// Parse a numeric reading, normalizing NDBC missing-value markers to `None`.
///
/// Empty fields, the `MM` token, unparsable text, and the documented
/// sentinel magnitudes all yield `None`, never a numeric stand-in.
pub fn parse_reading(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == MISSING_TOKEN {
        return None;
    }
    let value: f64 = trimmed.parse().ok()?;
    if SENTINEL_MAGNITUDES.contains(&value) {
        return None;
    }
    Some(value)
}

/// Parse a `"34.700 N"` / `"72.700 W"` coordinate token into signed degrees.
///
/// South and west are negated. Trailing text after the direction letter
/// is ignored (the station table sometimes appends a DMS rendering).
/// Returns `None` when the token does not lead with a number followed by
/// an N/S/E/W letter.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();

    let numeric_end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(trimmed.len());
    let value: f64 = trimmed[..numeric_end].parse().ok()?;

    let direction = trimmed[numeric_end..].trim_start().chars().next()?;
    match direction.to_ascii_uppercase() {
        'N' | 'E' => Some(value),
        'S' | 'W' => Some(-value),
        _ => None,
    }
}

/// Whether a token is a buoy-like NDBC station identifier: exactly five
/// ASCII digits. The feeds mix in ship reports and C-MAN codes, which
/// the pipeline does not track.
pub fn is_station_id(token: &str) -> bool {
    token.len() == 5 && token.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_parses_ordinary_values() {
        assert_eq!(parse_reading("3.5"), Some(3.5));
        assert_eq!(parse_reading(" 1013.2 "), Some(1013.2));
        assert_eq!(parse_reading("-2.1"), Some(-2.1));
        assert_eq!(parse_reading("0.0"), Some(0.0));
    }

    #[test]
    fn test_reading_normalizes_missing_token() {
        assert_eq!(parse_reading("MM"), None);
        assert_eq!(parse_reading(" MM "), None);
        assert_eq!(parse_reading(""), None);
        assert_eq!(parse_reading("   "), None);
    }

    #[test]
    fn test_reading_normalizes_sentinel_magnitudes() {
        assert_eq!(parse_reading("99.0"), None);
        assert_eq!(parse_reading("99"), None);
        assert_eq!(parse_reading("999.0"), None);
        assert_eq!(parse_reading("9999.0"), None);
    }

    #[test]
    fn test_reading_keeps_values_near_sentinels() {
        // Only the exact magnitudes are markers; 98.9 is a real reading.
        assert_eq!(parse_reading("98.9"), Some(98.9));
        assert_eq!(parse_reading("99.1"), Some(99.1));
        assert_eq!(parse_reading("998.0"), Some(998.0));
    }

    #[test]
    fn test_reading_rejects_garbage() {
        assert_eq!(parse_reading("N/A"), None);
        assert_eq!(parse_reading("12..3"), None);
    }

    #[test]
    fn test_coordinate_signs() {
        assert_eq!(parse_coordinate("34.700 N"), Some(34.7));
        assert_eq!(parse_coordinate("23.5 S"), Some(-23.5));
        assert_eq!(parse_coordinate("72.700 W"), Some(-72.7));
        assert_eq!(parse_coordinate("144.8 E"), Some(144.8));
    }

    #[test]
    fn test_coordinate_tolerates_spacing_and_case() {
        assert_eq!(parse_coordinate("34.700N"), Some(34.7));
        assert_eq!(parse_coordinate(" 34.700  n "), Some(34.7));
        assert_eq!(parse_coordinate("72.700 w (72°42'0\" W)"), Some(-72.7));
    }

    #[test]
    fn test_coordinate_rejects_malformed_tokens() {
        assert_eq!(parse_coordinate(""), None);
        assert_eq!(parse_coordinate("N 34.7"), None);
        assert_eq!(parse_coordinate("34.7"), None);
        assert_eq!(parse_coordinate("34.7 X"), None);
        assert_eq!(parse_coordinate("abc N"), None);
    }

    #[test]
    fn test_station_id_pattern() {
        assert!(is_station_id("41001"));
        assert!(is_station_id("00000"));
        assert!(!is_station_id("4100"));
        assert!(!is_station_id("410011"));
        assert!(!is_station_id("BUZM3"));
        assert!(!is_station_id("41 01"));
        assert!(!is_station_id(""));
    }
}
