//! The seam through which image pixels enter the core.
//!
//! The core never performs I/O. Renders hand an [`ImageRequest`] to an
//! [`ImageLoader`] implementation supplied by the caller.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::element::ImagePixels;
use crate::{CanvasError, CanvasResult};

/// CORS mode an image is requested with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CrossOrigin {
    /// No credentials are sent.
    #[default]
    Anonymous,
    /// Credentials are sent.
    UseCredentials,
}

/// A request for decoded image pixels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRequest {
    /// Source URL or data URI.
    pub url: String,
    /// CORS mode.
    pub cross_origin: CrossOrigin,
}

impl ImageRequest {
    /// Anonymous request for `url`.
    #[must_use]
    pub fn anonymous(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            cross_origin: CrossOrigin::Anonymous,
        }
    }
}

/// Fetches and decodes images.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Load the image named by `request`.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::ResourceLoad`] if the image cannot be fetched
    /// or decoded.
    async fn load(&self, request: &ImageRequest) -> CanvasResult<ImagePixels>;
}

/// Loader serving a fixed set of images from memory.
///
/// Unknown URLs fail to load.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    images: HashMap<String, ImagePixels>,
}

impl MemoryLoader {
    /// Empty loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `pixels` for `url`.
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>, pixels: ImagePixels) -> Self {
        self.images.insert(url.into(), pixels);
        self
    }

    /// Serve a solid-color image of the given size for `url`.
    #[must_use]
    pub fn with_solid(self, url: impl Into<String>, width: u32, height: u32, rgba: [u8; 4]) -> Self {
        self.with_image(url, ImagePixels::solid(width, height, rgba))
    }
}

#[async_trait]
impl ImageLoader for MemoryLoader {
    async fn load(&self, request: &ImageRequest) -> CanvasResult<ImagePixels> {
        self.images
            .get(&request.url)
            .cloned()
            .ok_or_else(|| CanvasError::ResourceLoad(request.url.clone()))
    }
}
