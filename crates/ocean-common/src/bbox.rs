//! Geographic bounding box for station queries.

use serde::{Deserialize, Serialize};

/// A latitude/longitude bounding box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// An inverted box (min above max on either axis) selects nothing.
    pub fn is_empty(&self) -> bool {
        self.min_lat > self.max_lat || self.min_lon > self.max_lon
    }

    /// Check if a point falls within this box. Bounds are inclusive.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_inclusive_at_bounds() {
        let bbox = BoundingBox::new(20.0, -80.0, 40.0, -60.0);

        assert!(bbox.contains(20.0, -70.0));
        assert!(bbox.contains(40.0, -70.0));
        assert!(bbox.contains(30.0, -80.0));
        assert!(bbox.contains(30.0, -60.0));
    }

    #[test]
    fn test_contains_excludes_outside_points() {
        let bbox = BoundingBox::new(20.0, -80.0, 40.0, -60.0);

        assert!(!bbox.contains(19.0, -70.0));
        assert!(!bbox.contains(41.0, -70.0));
        assert!(!bbox.contains(30.0, -81.0));
        assert!(!bbox.contains(30.0, -59.0));
    }

    #[test]
    fn test_inverted_box_is_empty() {
        assert!(BoundingBox::new(40.0, -80.0, 20.0, -60.0).is_empty());
        assert!(BoundingBox::new(20.0, -60.0, 40.0, -80.0).is_empty());
        assert!(!BoundingBox::new(20.0, -80.0, 40.0, -60.0).is_empty());
    }

    #[test]
    fn test_degenerate_box_contains_its_single_point() {
        let bbox = BoundingBox::new(34.7, -72.7, 34.7, -72.7);
        assert!(!bbox.is_empty());
        assert!(bbox.contains(34.7, -72.7));
    }
}
