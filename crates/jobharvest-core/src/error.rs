use thiserror::Error;

/// Application-wide error types for jobharvest.
#[derive(Error, Debug)]
pub enum AppError {
    /// A configuration value could not be used (malformed number, bad URL, ...).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The provider returned something that is not a job batch.
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// CSV encoding or decoding failed.
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AppError {
    /// Returns true if the error originated at the job source rather than locally.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            AppError::HttpError(_)
                | AppError::NetworkError(_)
                | AppError::Timeout(_)
                | AppError::ProviderError(_)
        )
    }
}
