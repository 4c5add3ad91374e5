//! Core Error Types
//!
//! Errors raised while loading or validating schema descriptors and
//! specifications. Only thiserror + std + serde_json, so the core crate stays
//! lightweight.

use thiserror::Error;

/// Core error type for the Agent Blueprint workspace.
#[derive(Error, Debug)]
pub enum CoreError {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Schema descriptor is structurally invalid
    #[error("Schema error: {0}")]
    Schema(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create a schema error
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
