use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use upbrella_locator::api::AppState;
use upbrella_locator::cache::PersistentCache;
use upbrella_locator::config::{CatalogSource, LocatorConfig};
use upbrella_locator::{CachedCatalog, FileCatalog, RemoteCatalog, StoreCatalog, logging, web};

#[tokio::main]
async fn main() -> Result<()> {
    // An explicit config path may be passed as the only argument
    let config = match std::env::args_os().nth(1) {
        Some(path) => LocatorConfig::load_from_path(Some(PathBuf::from(path)))?,
        None => LocatorConfig::load()?,
    };

    logging::init(&config.logging)?;
    info!("Starting upbrella-locator {}", upbrella_locator::VERSION);

    let catalog = build_catalog(&config).await?;
    let state = AppState::new(catalog, config.position.timeout())
        .with_default_position(config.position.default_position()?);

    web::run(&config.server, state).await
}

async fn build_catalog(config: &LocatorConfig) -> Result<Arc<dyn StoreCatalog>> {
    let catalog: Arc<dyn StoreCatalog> = match config.catalog.source {
        CatalogSource::File => {
            let catalog = FileCatalog::load(&config.catalog.file_path)
                .await
                .with_context(|| {
                    format!("Failed to load catalog from {}", config.catalog.file_path)
                })?;
            Arc::new(catalog)
        }
        CatalogSource::Remote => {
            info!("Using store backend at {}", config.catalog.base_url);
            Arc::new(RemoteCatalog::new(&config.catalog)?)
        }
    };

    if !config.cache.enabled {
        return Ok(catalog);
    }

    let cache = PersistentCache::open(&config.cache.location)
        .with_context(|| format!("Failed to open cache at {}", config.cache.location))?;
    info!(
        "Caching catalog responses in {} for {} minutes",
        config.cache.location, config.cache.ttl_minutes
    );
    let cached = CachedCatalog::new(catalog, cache, config.cache.ttl()).await?;
    Ok(Arc::new(cached))
}
