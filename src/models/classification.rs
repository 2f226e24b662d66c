//! Classification (district) model

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Classification identity
pub type ClassificationId = i64;

/// A district grouping of rental stores; its coordinates centre the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub id: ClassificationId,
    pub name: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Classification {
    #[must_use]
    pub fn new(id: ClassificationId, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Map centre for this district.
    ///
    /// Missing, zero or out-of-range coordinates yield `None`; the map then
    /// keeps its current centre.
    #[must_use]
    pub fn center(&self) -> Option<GeoPoint> {
        let (lat, lng) = (self.latitude?, self.longitude?);
        if lat == 0.0 || lng == 0.0 {
            return None;
        }
        GeoPoint::new(lat, lng).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_center() {
        let sinchon = Classification::new(1, "Sinchon", 37.5559, 126.9368);
        let center = sinchon.center().unwrap();
        assert_eq!((center.lat(), center.lng()), (37.5559, 126.9368));
    }

    #[rstest]
    #[case(Some(0.0), Some(126.9))]
    #[case(Some(37.5), Some(0.0))]
    #[case(None, Some(126.9))]
    #[case(Some(37.5), None)]
    #[case(Some(137.5), Some(126.9))]
    fn test_center_missing(#[case] latitude: Option<f64>, #[case] longitude: Option<f64>) {
        let classification = Classification {
            id: 2,
            name: "Unplaced".to_string(),
            latitude,
            longitude,
        };
        assert!(classification.center().is_none());
    }

    #[test]
    fn test_deserialize_without_coordinates() {
        let c: Classification = serde_json::from_str(r#"{"id":3,"name":"Hongdae"}"#).unwrap();
        assert_eq!(c.latitude, None);
        assert!(c.center().is_none());
    }
}
