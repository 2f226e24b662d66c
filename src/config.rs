//! Configuration management for the locator service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::LocatorError;
use crate::geo::GeoPoint;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the locator service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Where store data comes from
    pub catalog: CatalogConfig,
    /// Catalog cache settings
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// User position handling
    pub position: PositionConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Per-request timeout in seconds
    pub request_timeout_seconds: u32,
}

/// Source of the store catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    /// JSON document on disk
    File,
    /// Store backend over HTTP
    Remote,
}

/// Catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub source: CatalogSource,
    /// Catalog document used when `source = "file"`
    pub file_path: String,
    /// Store backend base URL used when `source = "remote"`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    pub max_retries: u32,
}

/// Catalog cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Entry TTL in minutes
    pub ttl_minutes: u32,
    /// Cache directory location
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

/// User position settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    /// How long to wait for a position before falling back, in milliseconds
    pub timeout_ms: u64,
    /// Position assumed when a client sends none, e.g. a campus kiosk
    pub default_lat: Option<f64>,
    pub default_lng: Option<f64>,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u32 {
    30
}

fn default_catalog_file() -> String {
    "catalog.json".to_string()
}

fn default_base_url() -> String {
    "http://localhost:8081".to_string()
}

fn default_catalog_timeout() -> u32 {
    10
}

fn default_catalog_max_retries() -> u32 {
    3
}

fn default_cache_ttl() -> u32 {
    5
}

fn default_cache_location() -> String {
    dirs::cache_dir()
        .map(|dir| dir.join("upbrella").to_string_lossy().into_owned())
        .unwrap_or_else(|| ".cache/upbrella".to_string())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_position_timeout() -> u64 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            source: CatalogSource::File,
            file_path: default_catalog_file(),
            base_url: default_base_url(),
            timeout_seconds: default_catalog_timeout(),
            max_retries: default_catalog_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_minutes: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for PositionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_position_timeout(),
            default_lat: None,
            default_lng: None,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_minutes) * 60)
    }
}

impl PositionConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Configured default position, if both halves are set and valid
    pub fn default_position(&self) -> std::result::Result<Option<GeoPoint>, LocatorError> {
        match (self.default_lat, self.default_lng) {
            (Some(lat), Some(lng)) => GeoPoint::new(lat, lng).map(Some),
            (None, None) => Ok(None),
            _ => Err(LocatorError::config(
                "position.default_lat and position.default_lng must be set together",
            )),
        }
    }
}

impl ServerConfig {
    /// Address the HTTP server binds to
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl LocatorConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // UPBRELLA_CATALOG__BASE_URL overrides catalog.base_url
        builder = builder.add_source(
            Environment::with_prefix("UPBRELLA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: LocatorConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("upbrella").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.server.host.is_empty() {
            self.server.host = default_host();
        }
        if self.server.port == 0 {
            self.server.port = default_port();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.catalog.file_path.is_empty() {
            self.catalog.file_path = default_catalog_file();
        }
        if self.catalog.base_url.is_empty() {
            self.catalog.base_url = default_base_url();
        }
        if self.catalog.timeout_seconds == 0 {
            self.catalog.timeout_seconds = default_catalog_timeout();
        }
        if self.cache.ttl_minutes == 0 {
            self.cache.ttl_minutes = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.position.timeout_ms == 0 {
            self.position.timeout_ms = default_position_timeout();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.server.request_timeout_seconds > 300 {
            return Err(
                LocatorError::config("Request timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.catalog.timeout_seconds > 120 {
            return Err(
                LocatorError::config("Catalog timeout cannot exceed 120 seconds").into(),
            );
        }

        if self.catalog.max_retries > 10 {
            return Err(LocatorError::config("Catalog max retries cannot exceed 10").into());
        }

        if self.cache.ttl_minutes > 24 * 60 {
            return Err(
                LocatorError::config("Cache TTL cannot exceed 1440 minutes (1 day)").into(),
            );
        }

        if self.position.timeout_ms > 60_000 {
            return Err(
                LocatorError::config("Position timeout cannot exceed 60000 ms").into(),
            );
        }

        self.position
            .default_position()
            .context("Invalid default position")?;

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(LocatorError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(LocatorError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if self.catalog.source == CatalogSource::Remote
            && !self.catalog.base_url.starts_with("http://")
            && !self.catalog.base_url.starts_with("https://")
        {
            return Err(LocatorError::config(
                "Catalog base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}
