//! Error types for ocean-monitor services.

use thiserror::Error;

/// Result type alias using OceanError.
pub type OceanResult<T> = Result<T, OceanError>;

/// Primary error type for ingestion and query operations.
#[derive(Debug, Error)]
pub enum OceanError {
    // === Upstream feed errors ===
    #[error("Feed fetch failed: {0}")]
    FetchError(String),

    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Request timeout")]
    Timeout,

    // === Storage errors ===
    #[error("Database error: {0}")]
    DatabaseError(String),

    // === Infrastructure errors ===
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for OceanError {
    fn from(err: std::io::Error) -> Self {
        OceanError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for OceanError {
    fn from(err: serde_json::Error) -> Self {
        OceanError::InternalError(format!("JSON error: {}", err))
    }
}
