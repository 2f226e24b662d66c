//! Rental form data for a single umbrella

use serde::{Deserialize, Serialize};

use super::store::StoreId;

/// Umbrella identity, as encoded in the QR code on the umbrella
pub type UmbrellaId = i64;

/// What the rental form shows before the user confirms a rental
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentFormData {
    /// District of the store currently holding the umbrella
    pub classification_name: String,
    pub rent_store_name: String,
    /// Number printed on the umbrella
    pub umbrella_uuid: i64,
    /// Store the rental is recorded against
    pub store_meta_id: StoreId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_payload() {
        let form: RentFormData = serde_json::from_str(
            r#"{"classificationName":"Sinchon","rentStoreName":"Yonsei Gate","umbrellaUuid":31,"storeMetaId":11}"#,
        )
        .unwrap();
        assert_eq!(form.rent_store_name, "Yonsei Gate");
        assert_eq!(form.umbrella_uuid, 31);
        assert_eq!(form.store_meta_id, 11);
    }
}
