//! Renderer error types.

use adcanvas_core::CanvasError;
use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while loading images or exporting a scene.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Resource could not be fetched.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// Bytes could not be decoded as an image.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Scene could not be rasterized or encoded.
    #[error("Export failed: {0}")]
    Export(String),

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RenderError> for CanvasError {
    fn from(err: RenderError) -> Self {
        CanvasError::ResourceLoad(err.to_string())
    }
}
