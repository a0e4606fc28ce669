//! Error types for the application

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unknown meter: {0}")]
    UnknownMeter(String),

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Invalid quantity {input:?}: must be a whole number of at least 1")]
    InvalidQuantity { input: String },

    #[error("Invalid rate for {field}: {value} (must be a non-negative number)")]
    InvalidRate { field: String, value: f64 },

    #[error("Service {0} requires TerraAI to be opted in")]
    ServiceRequiresAi(String),

    #[error("Admin session required")]
    Unauthorized,

    #[error("Storage quota exceeded: {needed} bytes needed, {available} available")]
    StorageQuota { needed: usize, available: usize },
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
