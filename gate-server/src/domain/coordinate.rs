//! Coordinates and distances.

use geo::{EuclideanDistance, HaversineDistance, Point};
use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Great-circle distance in metres.
    pub fn haversine_m(&self, other: &Coordinate) -> f64 {
        self.point().haversine_distance(&other.point())
    }

    /// Straight-line distance in raw degree space.
    ///
    /// Only meaningful as a ratio between two such distances; it is what the
    /// gate passage interpolation uses.
    pub fn planar_distance(&self, other: &Coordinate) -> f64 {
        self.point().euclidean_distance(&other.point())
    }

    /// Both components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180].
    pub fn is_geographic(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_kollam_to_ernakulam() {
        // Roughly 130 km as the crow flies
        let qln = Coordinate::new(8.8932118, 76.6141396);
        let ers = Coordinate::new(9.9816358, 76.2998842);
        let d = qln.haversine_m(&ers);
        assert!((d - 125_000.0).abs() < 10_000.0, "got {d}");
    }

    #[test]
    fn haversine_is_symmetric() {
        let a = Coordinate::new(8.5, 76.9);
        let b = Coordinate::new(9.1, 76.5);
        assert!((a.haversine_m(&b) - b.haversine_m(&a)).abs() < 1e-6);
        assert_eq!(a.haversine_m(&a), 0.0);
    }

    #[test]
    fn planar_distance_is_pythagorean() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);
        assert!((a.planar_distance(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn nan_is_not_finite() {
        assert!(!Coordinate::new(f64::NAN, 1.0).is_finite());
        assert!(Coordinate::new(8.0, 76.0).is_finite());
    }

    #[test]
    fn geographic_bounds_are_inclusive() {
        assert!(Coordinate::new(90.0, -180.0).is_geographic());
        assert!(Coordinate::new(-90.0, 180.0).is_geographic());
        assert!(!Coordinate::new(90.5, 76.0).is_geographic());
        assert!(!Coordinate::new(8.0, 180.5).is_geographic());
        assert!(!Coordinate::new(1e13, 76.6).is_geographic());
        assert!(!Coordinate::new(f64::NAN, 76.6).is_geographic());
    }
}
