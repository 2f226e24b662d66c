//! Upbrella store locator
//!
//! Picks the rental store highlighted on the map when a district is opened:
//! the nearest store to the user when their position is known, a random one
//! otherwise. Around that core sit the store catalog backends, the locator
//! view state with its marker reconciliation, and a small HTTP API.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod geo;
pub mod locator;
pub mod logging;
pub mod markers;
pub mod models;
pub mod position;
pub mod selector;
pub mod web;

// Re-export core types for public API
pub use catalog::{CachedCatalog, FileCatalog, RemoteCatalog, StoreCatalog};
pub use config::LocatorConfig;
pub use error::LocatorError;
pub use geo::{GeoPoint, distance};
pub use locator::{LocatorEvent, LocatorState};
pub use markers::{Marker, MarkerDiff, markers_for, reconcile};
pub use models::{Classification, ClassificationId, Store, StoreDetail, StoreId, StoreImage};
pub use position::{PositionProvider, resolve_position};
pub use selector::{RandomSource, nearest_store, select_default_store};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, LocatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
