//! Catalog loaded from a JSON document

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::StoreCatalog;
use crate::models::{
    Classification, ClassificationId, RentFormData, Store, StoreDetail, StoreId, UmbrellaId,
};
use crate::{LocatorError, Result};

/// On-disk layout of a catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogDocument {
    pub classifications: Vec<Classification>,
    #[serde(default)]
    pub stores: Vec<CatalogStore>,
    #[serde(default)]
    pub details: Vec<StoreDetail>,
    #[serde(default)]
    pub umbrellas: Vec<CatalogUmbrella>,
}

/// An umbrella and the store currently holding it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogUmbrella {
    pub id: UmbrellaId,
    pub uuid: i64,
    pub store_id: StoreId,
}

/// A store together with the classification it belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStore {
    pub classification_id: ClassificationId,
    #[serde(flatten)]
    pub store: Store,
}

/// In-memory catalog built from a [`CatalogDocument`]
#[derive(Debug, Clone)]
pub struct FileCatalog {
    classifications: Vec<Classification>,
    stores: HashMap<ClassificationId, Vec<Store>>,
    details: HashMap<StoreId, StoreDetail>,
    umbrellas: HashMap<UmbrellaId, CatalogUmbrella>,
}

impl FileCatalog {
    /// Load and validate a catalog file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let document: CatalogDocument = serde_json::from_str(&raw).map_err(|e| {
            LocatorError::catalog(format!(
                "Failed to parse catalog file {}: {e}",
                path.display()
            ))
        })?;

        let catalog = Self::from_document(document)?;
        info!(
            "Loaded catalog from {}: {} classifications, {} stores",
            path.display(),
            catalog.classifications.len(),
            catalog.stores.values().map(Vec::len).sum::<usize>()
        );
        Ok(catalog)
    }

    /// Build a catalog, rejecting duplicate ids and dangling classification references.
    ///
    /// Stores whose coordinates cannot be placed on a map are skipped.
    pub fn from_document(document: CatalogDocument) -> Result<Self> {
        let mut classification_ids = HashSet::new();
        for classification in &document.classifications {
            if !classification_ids.insert(classification.id) {
                return Err(LocatorError::validation(format!(
                    "Duplicate classification id {}",
                    classification.id
                )));
            }
        }

        let mut store_ids = HashSet::new();
        let mut stores: HashMap<ClassificationId, Vec<Store>> = document
            .classifications
            .iter()
            .map(|c| (c.id, Vec::new()))
            .collect();

        for entry in document.stores {
            let store = entry.store;
            if store.id <= 0 {
                return Err(LocatorError::validation(format!(
                    "Store id must be positive, got {}",
                    store.id
                )));
            }
            if !store_ids.insert(store.id) {
                return Err(LocatorError::validation(format!(
                    "Duplicate store id {}",
                    store.id
                )));
            }
            if !store.has_valid_position() {
                warn!(
                    "Skipping store {} ({}) with invalid coordinates {}, {}",
                    store.id, store.name, store.latitude, store.longitude
                );
                continue;
            }
            let Some(list) = stores.get_mut(&entry.classification_id) else {
                return Err(LocatorError::validation(format!(
                    "Store {} references unknown classification {}",
                    store.id, entry.classification_id
                )));
            };
            list.push(store);
        }

        let mut umbrellas = HashMap::new();
        for umbrella in document.umbrellas {
            if !store_ids.contains(&umbrella.store_id) {
                return Err(LocatorError::validation(format!(
                    "Umbrella {} references unknown store {}",
                    umbrella.id, umbrella.store_id
                )));
            }
            let id = umbrella.id;
            if umbrellas.insert(id, umbrella).is_some() {
                return Err(LocatorError::validation(format!("Duplicate umbrella id {id}")));
            }
        }

        let details = document
            .details
            .into_iter()
            .map(|detail| (detail.id, detail))
            .collect();

        Ok(Self {
            classifications: document.classifications,
            stores,
            details,
            umbrellas,
        })
    }

    fn find_store(&self, store_id: StoreId) -> Option<&Store> {
        self.stores
            .values()
            .flat_map(|list| list.iter())
            .find(|store| store.id == store_id)
    }

    fn classification_of(&self, store_id: StoreId) -> Option<&Classification> {
        let (classification_id, _) = self
            .stores
            .iter()
            .find(|(_, list)| list.iter().any(|store| store.id == store_id))?;
        self.classifications
            .iter()
            .find(|c| c.id == *classification_id)
    }
}

#[async_trait]
impl StoreCatalog for FileCatalog {
    async fn classifications(&self) -> Result<Vec<Classification>> {
        Ok(self.classifications.clone())
    }

    async fn stores_in(&self, classification_id: ClassificationId) -> Result<Vec<Store>> {
        self.stores
            .get(&classification_id)
            .cloned()
            .ok_or_else(|| {
                LocatorError::not_found(format!("classification {classification_id}"))
            })
    }

    async fn store_detail(&self, store_id: StoreId) -> Result<Option<StoreDetail>> {
        if let Some(detail) = self.details.get(&store_id) {
            return Ok(Some(detail.clone()));
        }

        // Stores without a detail record still get a card with the basics
        Ok(self.find_store(store_id).map(|store| StoreDetail {
            id: store.id,
            name: store.name.clone(),
            category: None,
            classification_name: None,
            address: None,
            address_detail: None,
            open_status: false,
            business_hours: None,
            contact_info: None,
            instagram_id: None,
            rentable_umbrellas_count: store.rentable_umbrellas_count,
            latitude: store.latitude,
            longitude: store.longitude,
            image_urls: Vec::new(),
        }))
    }

    async fn rent_form(&self, umbrella_id: UmbrellaId) -> Result<Option<RentFormData>> {
        let Some(umbrella) = self.umbrellas.get(&umbrella_id) else {
            return Ok(None);
        };
        // Held by a store that was skipped for bad coordinates
        let (Some(store), Some(classification)) = (
            self.find_store(umbrella.store_id),
            self.classification_of(umbrella.store_id),
        ) else {
            warn!(
                "Umbrella {} is held by unlisted store {}",
                umbrella_id, umbrella.store_id
            );
            return Ok(None);
        };

        Ok(Some(RentFormData {
            classification_name: classification.name.clone(),
            rent_store_name: store.name.clone(),
            umbrella_uuid: umbrella.uuid,
            store_meta_id: store.id,
        }))
    }
}
