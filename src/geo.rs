//! Geographic points and great-circle distance
//!
//! Every distance in the locator goes through [`distance`], so ranking stores
//! and reporting how far away they are always agree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LocatorError;

/// Mean Earth radius used for all distance calculations
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = LocatorError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// Create a point, rejecting non-finite or out-of-range coordinates
    pub fn new(lat: f64, lng: f64) -> Result<Self, LocatorError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(LocatorError::validation(format!(
                "Latitude must be between -90 and 90, got: {lat}"
            )));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(LocatorError::validation(format!(
                "Longitude must be between -180 and 180, got: {lng}"
            )));
        }
        Ok(Self { lat, lng })
    }

    /// Create a point from coordinates that were already validated upstream
    /// (store records coming out of the catalog).
    #[must_use]
    pub(crate) const fn new_unchecked(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Distance to another point in kilometers
    #[must_use]
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance(*self, *other)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Parse "37.5,127.0" or "37.5 127.0"
impl FromStr for GeoPoint {
    type Err = LocatorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() != 2 {
            return Err(LocatorError::validation(
                "Coordinates must be in format 'lat,lng'",
            ));
        }

        let lat = parts[0]
            .parse::<f64>()
            .map_err(|_| LocatorError::validation(format!("Invalid latitude: {}", parts[0])))?;
        let lng = parts[1]
            .parse::<f64>()
            .map_err(|_| LocatorError::validation(format!("Invalid longitude: {}", parts[1])))?;

        GeoPoint::new(lat, lng)
    }
}

/// Great-circle distance in kilometers between two points (haversine).
///
/// `sqrt(h)` is clamped to 1 so rounding near antipodal points cannot push
/// `asin` out of its domain.
#[must_use]
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
