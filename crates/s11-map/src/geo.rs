//! Geographic value types.

use std::fmt;

use serde::{Deserialize, Serialize};

use s11_core::error::AppError;
use s11_core::result::AppResult;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
}

impl LatLng {
    /// Creates a coordinate without validation.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a coordinate, rejecting values outside the valid ranges.
    pub fn try_new(lat: f64, lng: f64) -> AppResult<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(AppError::validation(format!("Latitude out of range: {lat}")));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::validation(format!("Longitude out of range: {lng}")));
        }
        Ok(Self { lat, lng })
    }

    /// Creates a coordinate from `[longitude, latitude]` (GeoJSON order).
    pub fn from_lng_lat(pair: [f64; 2]) -> AppResult<Self> {
        Self::try_new(pair[1], pair[0])
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lng)
    }
}

/// A rectangular area given by its south-west and north-east corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    /// South-west corner.
    pub south_west: LatLng,
    /// North-east corner.
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Bounds extending `margin` degrees around `center` in every direction.
    pub fn around(center: LatLng, margin: f64) -> Self {
        Self {
            south_west: LatLng::new(center.lat - margin, center.lng - margin),
            north_east: LatLng::new(center.lat + margin, center.lng + margin),
        }
    }

    /// Returns whether `point` lies within the bounds (edges included).
    pub fn contains(&self, point: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }

    /// Center of the bounds.
    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_out_of_range() {
        assert!(LatLng::try_new(13.75, 100.5).is_ok());
        assert!(LatLng::try_new(91.0, 0.0).is_err());
        assert!(LatLng::try_new(0.0, -180.5).is_err());
        assert!(LatLng::try_new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_from_lng_lat_swaps_order() {
        let pos = LatLng::from_lng_lat([100.5, 13.75]).expect("valid");
        assert_eq!(pos, LatLng::new(13.75, 100.5));
    }

    #[test]
    fn test_bounds_around() {
        let center = LatLng::new(13.75, 100.5);
        let bounds = LatLngBounds::around(center, 0.2);
        assert!(bounds.contains(center));
        assert!(bounds.contains(LatLng::new(13.9, 100.3)));
        assert!(!bounds.contains(LatLng::new(14.0, 100.5)));

        let mid = bounds.center();
        assert!((mid.lat - center.lat).abs() < 1e-9);
        assert!((mid.lng - center.lng).abs() < 1e-9);
    }
}
