//! Catalog backed by the store backend's HTTP API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::StoreCatalog;
use crate::config::CatalogConfig;
use crate::models::{
    Classification, ClassificationId, RentFormData, Store, StoreDetail, StoreId, UmbrellaId,
};
use crate::{LocatorError, Result};

/// The backend answers either with the payload itself or wrapped in `{ "data": ... }`
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}

/// HTTP client for the store backend
pub struct RemoteCatalog {
    client: ClientWithMiddleware,
    base_url: String,
}

impl RemoteCatalog {
    /// Create a client with timeout and transient-failure retries
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("upbrella-locator/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LocatorError::config(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET `path` and decode the payload; `Ok(None)` on 404
    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Store backend request: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LocatorError::catalog(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("Store backend returned 404 for {}", url);
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Store backend error {} for {}: {}", status, url, body);
            return Err(LocatorError::catalog(format!(
                "Store backend returned {status} for {path}"
            )));
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            LocatorError::catalog(format!("Failed to parse response from {path}: {e}"))
        })?;
        Ok(Some(envelope.into_inner()))
    }
}

#[async_trait]
impl StoreCatalog for RemoteCatalog {
    #[instrument(skip(self))]
    async fn classifications(&self) -> Result<Vec<Classification>> {
        // A 404 here means a wrong base URL or route
        let classifications: Vec<Classification> = self
            .fetch("/stores/classifications")
            .await?
            .ok_or_else(|| LocatorError::catalog("classifications endpoint not found"))?;
        info!("Fetched {} classifications", classifications.len());
        Ok(classifications)
    }

    #[instrument(skip(self))]
    async fn stores_in(&self, classification_id: ClassificationId) -> Result<Vec<Store>> {
        let stores: Vec<Store> = self
            .fetch(&format!("/stores/classifications/{classification_id}"))
            .await?
            .ok_or_else(|| {
                LocatorError::not_found(format!("classification {classification_id}"))
            })?;
        info!(
            "Fetched {} stores for classification {}",
            stores.len(),
            classification_id
        );
        Ok(stores)
    }

    #[instrument(skip(self))]
    async fn store_detail(&self, store_id: StoreId) -> Result<Option<StoreDetail>> {
        self.fetch(&format!("/stores/{store_id}")).await
    }

    #[instrument(skip(self))]
    async fn rent_form(&self, umbrella_id: UmbrellaId) -> Result<Option<RentFormData>> {
        self.fetch(&format!("/rent/form/{umbrella_id}")).await
    }
}
