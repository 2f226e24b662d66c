//! Persistent TTL cache in front of a catalog
//!
//! Cache keys carry a generation number. Invalidation bumps the generation,
//! so every earlier entry becomes unreachable at once and ages out by TTL.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::StoreCatalog;
use crate::cache::PersistentCache;
use crate::models::{
    Classification, ClassificationId, RentFormData, Store, StoreDetail, StoreId, UmbrellaId,
};
use crate::{LocatorError, Result};

const GENERATION_KEY: &str = "catalog:generation";
const GENERATION_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Caching decorator for any [`StoreCatalog`]
pub struct CachedCatalog<C> {
    inner: C,
    cache: PersistentCache,
    ttl: Duration,
    generation: AtomicU64,
}

impl<C: StoreCatalog> CachedCatalog<C> {
    /// Wrap `inner`, resuming the invalidation generation stored in `cache`
    pub async fn new(inner: C, cache: PersistentCache, ttl: Duration) -> Result<Self> {
        let generation: u64 = cache
            .get(GENERATION_KEY)
            .await
            .map_err(|e| LocatorError::cache(e.to_string()))?
            .unwrap_or(0);
        debug!("Catalog cache starting at generation {}", generation);

        Ok(Self {
            inner,
            cache,
            ttl,
            generation: AtomicU64::new(generation),
        })
    }

    fn key(&self, suffix: &str) -> String {
        format!(
            "catalog:{}:{}",
            self.generation.load(Ordering::Acquire),
            suffix
        )
    }

    /// Read-through lookup. Cache failures are logged and bypassed.
    async fn cached<T, F>(&self, suffix: &str, load: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Clone + Send + Debug + 'static,
        F: Future<Output = Result<T>>,
    {
        let key = self.key(suffix);

        match self.cache.get::<T>(&key).await {
            Ok(Some(hit)) => {
                debug!("Catalog cache hit for {}", key);
                return Ok(hit);
            }
            Ok(None) => debug!("Catalog cache miss for {}", key),
            Err(e) => warn!("Catalog cache read failed for {}: {}", key, e),
        }

        let value = load.await?;
        if let Err(e) = self.cache.put(&key, value.clone(), self.ttl).await {
            warn!("Catalog cache write failed for {}: {}", key, e);
        }
        Ok(value)
    }
}

#[async_trait]
impl<C: StoreCatalog> StoreCatalog for CachedCatalog<C> {
    async fn classifications(&self) -> Result<Vec<Classification>> {
        self.cached("classifications", self.inner.classifications())
            .await
    }

    async fn stores_in(&self, classification_id: ClassificationId) -> Result<Vec<Store>> {
        self.cached(
            &format!("stores:{classification_id}"),
            self.inner.stores_in(classification_id),
        )
        .await
    }

    async fn store_detail(&self, store_id: StoreId) -> Result<Option<StoreDetail>> {
        self.cached(
            &format!("detail:{store_id}"),
            self.inner.store_detail(store_id),
        )
        .await
    }

    async fn rent_form(&self, umbrella_id: UmbrellaId) -> Result<Option<RentFormData>> {
        self.cached(
            &format!("rent-form:{umbrella_id}"),
            self.inner.rent_form(umbrella_id),
        )
        .await
    }

    async fn invalidate(&self) -> Result<()> {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.cache
            .put(GENERATION_KEY, generation, GENERATION_TTL)
            .await
            .map_err(|e| LocatorError::cache(e.to_string()))?;
        info!("Catalog cache invalidated, now at generation {}", generation);
        self.inner.invalidate().await
    }
}
