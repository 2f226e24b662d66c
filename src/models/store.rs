//! Rental store records as delivered by the store backend

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Store identity
pub type StoreId = i64;

/// A physical umbrella rental/return location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Umbrellas currently available for rent at this store
    pub rentable_umbrellas_count: u32,
}

impl Store {
    #[must_use]
    pub fn new(id: StoreId, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            name: name.into(),
            latitude,
            longitude,
            rentable_umbrellas_count: 0,
        }
    }

    #[must_use]
    pub fn with_umbrellas(mut self, count: u32) -> Self {
        self.rentable_umbrellas_count = count;
        self
    }

    /// Store position on the map
    #[must_use]
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new_unchecked(self.latitude, self.longitude)
    }

    /// Whether the record can be placed on a map at all
    #[must_use]
    pub fn has_valid_position(&self) -> bool {
        GeoPoint::new(self.latitude, self.longitude).is_ok()
    }
}

/// One store image; the first image of a store is its thumbnail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreImage {
    pub id: i64,
    pub image_url: String,
}

/// Full store information shown on the store card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDetail {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub classification_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub address_detail: Option<String>,
    #[serde(default)]
    pub open_status: bool,
    #[serde(default)]
    pub business_hours: Option<String>,
    #[serde(default)]
    pub contact_info: Option<String>,
    #[serde(default)]
    pub instagram_id: Option<String>,
    #[serde(default)]
    pub rentable_umbrellas_count: u32,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub image_urls: Vec<StoreImage>,
}

impl StoreDetail {
    /// Thumbnail image, if the store has any images
    #[must_use]
    pub fn thumbnail(&self) -> Option<&StoreImage> {
        self.image_urls.first()
    }

    /// Full address line for display
    #[must_use]
    pub fn full_address(&self) -> Option<String> {
        match (&self.address, &self.address_detail) {
            (Some(address), Some(detail)) if !detail.is_empty() => {
                Some(format!("{address} {detail}"))
            }
            (Some(address), _) => Some(address.clone()),
            (None, _) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail_json() -> &'static str {
        r#"{
            "id": 7,
            "name": "Upbrella Sinchon",
            "classificationName": "Sinchon",
            "address": "Seoul Seodaemun-gu Yonsei-ro 1",
            "addressDetail": "1F",
            "openStatus": true,
            "rentableUmbrellasCount": 4,
            "latitude": 37.5559,
            "longitude": 126.9368,
            "imageUrls": [
                {"id": 11, "imageUrl": "https://cdn.example.com/a.jpg"},
                {"id": 12, "imageUrl": "https://cdn.example.com/b.jpg"}
            ]
        }"#
    }

    #[test]
    fn test_store_wire_format_is_camel_case() {
        let store = Store::new(1, "Upbrella Sinchon", 37.5559, 126.9368).with_umbrellas(3);
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["rentableUmbrellasCount"], 3);
        assert_eq!(json["latitude"], 37.5559);

        let back: Store = serde_json::from_value(json).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn test_store_position_validity() {
        assert!(Store::new(1, "ok", 37.5, 127.0).has_valid_position());
        assert!(!Store::new(2, "bad", 137.5, 127.0).has_valid_position());
    }

    #[test]
    fn test_detail_thumbnail_is_first_image() {
        let detail: StoreDetail = serde_json::from_str(detail_json()).unwrap();
        assert_eq!(detail.thumbnail().map(|i| i.id), Some(11));
        assert_eq!(detail.business_hours, None);
    }

    #[test]
    fn test_detail_without_images_has_no_thumbnail() {
        let mut detail: StoreDetail = serde_json::from_str(detail_json()).unwrap();
        detail.image_urls.clear();
        assert!(detail.thumbnail().is_none());
    }

    #[test]
    fn test_full_address() {
        let mut detail: StoreDetail = serde_json::from_str(detail_json()).unwrap();
        assert_eq!(
            detail.full_address().as_deref(),
            Some("Seoul Seodaemun-gu Yonsei-ro 1 1F")
        );
        detail.address_detail = Some(String::new());
        assert_eq!(
            detail.full_address().as_deref(),
            Some("Seoul Seodaemun-gu Yonsei-ro 1")
        );
        detail.address = None;
        assert!(detail.full_address().is_none());
    }
}
