//! Store catalog
//!
//! This module provides the store list side of the locator:
//! - The `StoreCatalog` seam every backend implements
//! - A JSON file catalog loaded once at start-up
//! - A remote catalog talking to the store backend over HTTP
//! - A persistent TTL cache that can sit in front of either

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::models::{
    Classification, ClassificationId, RentFormData, Store, StoreDetail, StoreId, UmbrellaId,
};

pub mod cached;
pub mod file;
pub mod remote;

pub use cached::CachedCatalog;
pub use file::{CatalogDocument, CatalogUmbrella, FileCatalog};
pub use remote::RemoteCatalog;

/// Read access to classifications and their stores
#[async_trait]
pub trait StoreCatalog: Send + Sync {
    /// All classifications, in display order
    async fn classifications(&self) -> Result<Vec<Classification>>;

    /// Stores of one classification, in the order the backend supplies them.
    /// Unknown classifications are a `NotFound` error.
    async fn stores_in(&self, classification_id: ClassificationId) -> Result<Vec<Store>>;

    /// Details of one store, `None` when it does not exist
    async fn store_detail(&self, store_id: StoreId) -> Result<Option<StoreDetail>>;

    /// Rental form for an umbrella, `None` when the umbrella is unknown
    async fn rent_form(&self, umbrella_id: UmbrellaId) -> Result<Option<RentFormData>>;

    /// Drop any cached data so the next read goes to the source
    async fn invalidate(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: StoreCatalog + ?Sized> StoreCatalog for Arc<T> {
    async fn classifications(&self) -> Result<Vec<Classification>> {
        (**self).classifications().await
    }

    async fn stores_in(&self, classification_id: ClassificationId) -> Result<Vec<Store>> {
        (**self).stores_in(classification_id).await
    }

    async fn store_detail(&self, store_id: StoreId) -> Result<Option<StoreDetail>> {
        (**self).store_detail(store_id).await
    }

    async fn rent_form(&self, umbrella_id: UmbrellaId) -> Result<Option<RentFormData>> {
        (**self).rent_form(umbrella_id).await
    }

    async fn invalidate(&self) -> Result<()> {
        (**self).invalidate().await
    }
}
