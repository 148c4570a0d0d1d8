//! Error types for the proximity query

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProximityError {
    // Geometry errors
    #[error("Geometry error: {reason}")]
    Geometry { reason: String },

    // Reference system errors
    #[error("Projection from WKID {from} to WKID {to} failed: {reason}")]
    Projection { from: u32, to: u32, reason: String },

    // Layer query errors
    #[error("Query against layer '{layer}' failed: {reason}")]
    Query { layer: String, reason: String },

    #[error("Query against layer '{layer}' timed out after {seconds:.1}s")]
    Timeout { layer: String, seconds: f64 },

    // Host operation errors
    #[error("Operation not registered: {name}")]
    OperationNotFound { name: String },

    #[error("Operation already registered: {name}")]
    OperationExists { name: String },

    #[error("Invalid arguments for {operation}: {reason}")]
    InvalidArguments { operation: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ProximityError {
    pub fn geometry(reason: impl Into<String>) -> Self {
        Self::Geometry { reason: reason.into() }
    }

    pub fn query(layer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Query { layer: layer.into(), reason: reason.into() }
    }
}

impl From<serde_json::Error> for ProximityError {
    fn from(err: serde_json::Error) -> Self {
        ProximityError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProximityError>;
