//! Error types for canvas operations.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
///
/// Validation violations are not errors; see [`crate::validation::ValidationError`].
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Object not found in scene.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Invalid object operation.
    #[error("Invalid operation on object: {0}")]
    InvalidOperation(String),

    /// Layout or scene serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Resource loading failed.
    #[error("Failed to load resource: {0}")]
    ResourceLoad(String),
}
