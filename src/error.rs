//! Error types and handling for the locator

use thiserror::Error;

/// Main error type for the locator library
#[derive(Error, Debug)]
pub enum LocatorError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Store catalog (file or backend) errors
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    /// Requested entity does not exist
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl LocatorError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new catalog error
    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Short machine-readable code used in API error bodies
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            LocatorError::Config { .. } => "config_error",
            LocatorError::Validation { .. } => "validation_error",
            LocatorError::Catalog { .. } => "catalog_error",
            LocatorError::NotFound { .. } => "not_found",
            LocatorError::Cache { .. } => "cache_error",
            LocatorError::Io { .. } => "io_error",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            LocatorError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            LocatorError::Validation { message } => format!("Invalid input: {message}"),
            LocatorError::Catalog { .. } => {
                "Unable to load rental stores right now. Please try again later.".to_string()
            }
            LocatorError::NotFound { message } => format!("Not found: {message}"),
            LocatorError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            LocatorError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
