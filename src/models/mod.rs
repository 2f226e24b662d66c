//! Data models for the store locator
//!
//! This module contains the catalog records organized by concern:
//! - Classification: district groupings that centre the map
//! - Store: rental locations, their details and images
//! - Rent: the rental form shown for a scanned umbrella

pub mod classification;
pub mod rent;
pub mod store;

// Re-export all public types for convenient access
pub use classification::{Classification, ClassificationId};
pub use rent::{RentFormData, UmbrellaId};
pub use store::{Store, StoreDetail, StoreId, StoreImage};
