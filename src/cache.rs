//! Disk-backed TTL cache
//!
//! Values are postcard-encoded next to their expiry time and kept in a fjall
//! keyspace. Database calls run on the blocking pool.

use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use fjall::Keyspace;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::{debug, instrument, warn};

#[derive(Serialize, Deserialize)]
struct Entry<T> {
    value: T,
    expires_at: u64,
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Key/value cache where every entry carries its own expiry
#[derive(Clone)]
pub struct PersistentCache {
    keyspace: Keyspace,
}

impl PersistentCache {
    /// Open the cache database at `path`, creating it when missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = fjall::Database::builder(path)
            .open()
            .with_context(|| format!("Failed to open cache database at {}", path.display()))?;
        let keyspace = db.keyspace("cache", fjall::KeyspaceCreateOptions::default)?;
        Ok(Self { keyspace })
    }

    #[instrument(name = "cache_put", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let expires_at = unix_now()?.saturating_add(ttl.as_secs());
        let bytes = postcard::to_stdvec(&Entry { value, expires_at })?;

        let keyspace = self.keyspace.clone();
        let key = key.as_bytes().to_vec();
        task::spawn_blocking(move || keyspace.insert(key, bytes)).await??;
        Ok(())
    }

    /// Fresh value for `key`. Expired or undecodable entries are deleted and
    /// reported as a miss.
    #[instrument(name = "cache_get", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let keyspace = self.keyspace.clone();
        let raw_key = key.as_bytes().to_vec();
        let stored = task::spawn_blocking(move || {
            keyspace.get(raw_key).map(|found| found.map(|bytes| bytes.to_vec()))
        })
        .await??;

        let Some(bytes) = stored else {
            return Ok(None);
        };

        match postcard::from_bytes::<Entry<T>>(&bytes) {
            Ok(entry) if unix_now()? < entry.expires_at => Ok(Some(entry.value)),
            Ok(_) => {
                debug!("Dropping expired entry");
                self.remove(key).await?;
                Ok(None)
            }
            Err(e) => {
                warn!("Dropping undecodable entry: {}", e);
                self.remove(key).await?;
                Ok(None)
            }
        }
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let keyspace = self.keyspace.clone();
        let key = key.as_bytes().to_vec();
        task::spawn_blocking(move || keyspace.remove(key)).await??;
        Ok(())
    }
}
