// Copyright 2025 Cowboy AI, LLC.

//! Geographic value objects and great-circle distance
//!
//! Coordinates are plain WGS84 latitude/longitude pairs. Distance uses the
//! haversine formula, which is symmetric and zero for identical points -
//! good enough for fare estimation, where road distance is a collaborator
//! concern (route polylines come from the geo resolver).

use crate::errors::{DispatchError, DispatchResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 latitude/longitude pair
///
/// # Examples
///
/// ```rust
/// use ride_dispatch::Coordinate;
///
/// let mumbai = Coordinate::new(19.076, 72.8777).unwrap();
/// let delhi = Coordinate::new(28.7041, 77.1025).unwrap();
///
/// let km = mumbai.haversine_km(&delhi);
/// assert!((km - 1163.0).abs() < 12.0);
/// assert_eq!(mumbai.haversine_km(&mumbai), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Coordinate {
    /// Latitude in degrees, -90 to 90
    pub lat: f64,
    /// Longitude in degrees, -180 to 180
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate, validating range and finiteness
    pub fn new(lat: f64, lng: f64) -> DispatchResult<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(DispatchError::validation(
                "coordinates must be finite numbers",
            ));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(DispatchError::validation(format!(
                "latitude {lat} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(DispatchError::validation(format!(
                "longitude {lng} out of range [-180, 180]"
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Great-circle distance to another coordinate in kilometers
    ///
    /// Symmetric: `a.haversine_km(&b) == b.haversine_km(&a)`.
    pub fn haversine_km(&self, other: &Coordinate) -> f64 {
        let (lat1, lon1) = (self.lat.to_radians(), self.lng.to_radians());
        let (lat2, lon2) = (other.lat.to_radians(), other.lng.to_radians());
        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;
        let sin_dlat = (dlat * 0.5).sin();
        let sin_dlon = (dlon * 0.5).sin();
        let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
        EARTH_RADIUS_KM * c
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// A resolved place: the coordinate plus the free-text name it came from
///
/// The original name is retained so lifecycle events can show riders and
/// drivers the text they typed, not raw coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Place {
    /// Free-text place name as entered by the user
    pub name: String,
    /// Resolved coordinate
    pub coordinate: Coordinate,
}

impl Place {
    /// Create a place from a name and its resolved coordinate
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            coordinate,
        }
    }
}

/// An encoded route polyline as returned by the geo resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RoutePolyline(pub String);

impl fmt::Display for RoutePolyline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = coord(10.0, 20.0);
        let b = coord(11.0, 20.0);
        let km = a.haversine_km(&b);
        // Within 1% of 111.19 km
        assert!((km - 111.19).abs() / 111.19 < 0.01, "got {km}");
    }

    #[test]
    fn mumbai_to_delhi_is_about_1163_km() {
        let mumbai = coord(19.076, 72.8777);
        let delhi = coord(28.7041, 77.1025);
        let km = mumbai.haversine_km(&delhi);
        assert!((km - 1163.0).abs() < 12.0, "got {km}");
    }

    #[test]
    fn rejects_out_of_range_and_non_finite() {
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, 181.0).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    proptest! {
        #[test]
        fn haversine_is_symmetric(lat1 in -90.0f64..90.0, lng1 in -180.0f64..180.0,
                                  lat2 in -90.0f64..90.0, lng2 in -180.0f64..180.0) {
            let a = coord(lat1, lng1);
            let b = coord(lat2, lng2);
            let ab = a.haversine_km(&b);
            let ba = b.haversine_km(&a);
            prop_assert!((ab - ba).abs() < 1e-9);
            prop_assert!(ab >= 0.0);
        }

        #[test]
        fn haversine_is_zero_for_identical_points(lat in -90.0f64..90.0,
                                                  lng in -180.0f64..180.0) {
            let a = coord(lat, lng);
            prop_assert_eq!(a.haversine_km(&a), 0.0);
        }
    }
}
