//! Error types for the tabflow pipelines

use thiserror::Error;

/// Result type alias for tabflow operations
pub type Result<T> = std::result::Result<T, TabflowError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum TabflowError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for TabflowError {
    fn from(err: polars::error::PolarsError) -> Self {
        TabflowError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for TabflowError {
    fn from(err: serde_json::Error) -> Self {
        TabflowError::SerializationError(err.to_string())
    }
}
